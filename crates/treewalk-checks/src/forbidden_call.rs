//! Check forbidding selected methods, macros and functions.
//!
//! # Rationale
//!
//! `.unwrap()`, `.expect()`, `dbg!` and friends panic or leak debug output
//! at runtime. Production code should propagate errors instead.
//!
//! # Configuration
//!
//! - `methods`: Forbidden method names (default: `unwrap, expect`)
//! - `macros`: Forbidden macro names (default: `dbg, todo, unimplemented`)
//! - `functions`: Forbidden function paths; matched on the full path or its
//!   trailing segments (default: none)
//! - `ignored_modules`: Inline modules whose contents are not checked
//!   (default: `tests`)

use treewalk_core::{
    parse_list, Check, CheckResult, Configurable, Node, Property, Reporter, TokenType,
};
use treewalk_syntax::tokens::{CALL, MACRO_CALL, METHOD_CALL, MOD_DEF};

/// Message key for a forbidden method call.
pub const MSG_METHOD: &str = "call.forbidden.method";
/// Message key for a forbidden macro.
pub const MSG_MACRO: &str = "call.forbidden.macro";
/// Message key for a forbidden function call.
pub const MSG_FUNCTION: &str = "call.forbidden.function";

/// Reports calls to forbidden methods, macros and functions.
#[derive(Debug, Clone)]
pub struct ForbiddenCallCheck {
    methods: Vec<String>,
    macros: Vec<String>,
    functions: Vec<String>,
    ignored_modules: Vec<String>,
}

impl Default for ForbiddenCallCheck {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect();
        Self {
            methods: list(&["unwrap", "expect"]),
            macros: list(&["dbg", "todo", "unimplemented"]),
            functions: Vec::new(),
            ignored_modules: list(&["tests"]),
        }
    }
}

impl ForbiddenCallCheck {
    fn in_ignored_module(&self, node: Node<'_>) -> bool {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if ancestor.token_type() == MOD_DEF
                && self.ignored_modules.iter().any(|m| m == ancestor.text())
            {
                return true;
            }
            current = ancestor.parent();
        }
        false
    }
}

/// `a::b::c` matches `c`, `b::c` and `a::b::c`.
fn path_matches(path: &str, pattern: &str) -> bool {
    let path = path.trim_start_matches("::");
    path == pattern
        || path
            .strip_suffix(pattern)
            .is_some_and(|head| head.ends_with("::"))
}

fn macro_name(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl Check for ForbiddenCallCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        vec![METHOD_CALL, MACRO_CALL, CALL]
    }

    fn description(&self) -> &'static str {
        "Forbids calls to selected methods, macros and functions"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[
            (MSG_METHOD, "Method '{0}' must not be called"),
            (MSG_MACRO, "Macro '{0}!' must not be used"),
            (MSG_FUNCTION, "Function '{0}' must not be called"),
        ]
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        let text = node.text();
        let key = match node.token_type() {
            ty if ty == METHOD_CALL && self.methods.iter().any(|m| m == text) => MSG_METHOD,
            ty if ty == MACRO_CALL && self.macros.iter().any(|m| m == macro_name(text)) => {
                MSG_MACRO
            }
            ty if ty == CALL && self.functions.iter().any(|f| path_matches(text, f)) => {
                MSG_FUNCTION
            }
            _ => return Ok(()),
        };
        if self.in_ignored_module(node) {
            tracing::trace!("Skipping `{}` inside an ignored module", text);
        } else {
            reporter.log_node(node, key, &[&text]);
        }
        Ok(())
    }
}

impl Configurable for ForbiddenCallCheck {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property {
            name: "methods",
            set: |check, value| {
                check.methods = parse_list(value)?;
                Ok(())
            },
        },
        Property {
            name: "macros",
            set: |check, value| {
                check.macros = parse_list(value)?;
                Ok(())
            },
        },
        Property {
            name: "functions",
            set: |check, value| {
                check.functions = parse_list(value)?;
                Ok(())
            },
        },
        Property {
            name: "ignored_modules",
            set: |check, value| {
                check.ignored_modules = parse_list(value)?;
                Ok(())
            },
        },
    ];
}
