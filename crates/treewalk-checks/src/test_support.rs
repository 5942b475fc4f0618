//! Runs one configured check over a snippet.

use std::sync::Arc;
use treewalk_core::{
    parse_list, CheckMeta, Configuration, DispatchTable, FileText, Language, Messages,
    RegisteredCheck, TreeWalker, Violation, WalkContext,
};
use treewalk_syntax::RustLanguage;

pub(crate) fn check_code(config: &Configuration, code: &str) -> Vec<Violation> {
    let registry = crate::registry();
    let (module, check) = registry
        .instantiate(config)
        .expect("Failed to instantiate");

    let mut meta = CheckMeta::new(module);
    meta.id = config.attribute("id").map(String::from);
    meta.tokens = config
        .attribute("tokens")
        .map(|t| parse_list(t).unwrap())
        .unwrap_or_default();
    meta.custom_messages = config.messages().clone();

    let mut messages = Messages::new("en");
    messages.add_defaults(check.messages());

    let checks = vec![RegisteredCheck { meta, check }];
    let language = RustLanguage::new();
    let table = DispatchTable::build(&language, &checks).expect("Failed to build dispatch table");

    let file = FileText::new("test.rs", code);
    let ast = language.parse(&file).expect("Failed to parse");
    let mut walker = TreeWalker::new(checks, Arc::new(table));
    walker.walk(
        &ast,
        &WalkContext {
            file: &file,
            messages: &messages,
            tab_width: 8,
        },
    )
}
