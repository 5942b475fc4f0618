//! Built-in checks driven by the engine over a small on-disk project.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use treewalk_checks::{registry, Preset};
use treewalk_core::{
    AuditListener, Checker, ConfigFile, ListenerResult, SuppressionCommentFilter, Violation,
    GENERAL_PARSE_ERROR,
};
use treewalk_syntax::RustLanguage;

const CONFIG: &str = r#"
[checker]
threads = 2

[[module]]
name = "FunctionLength"
[module.properties]
max = 3

[[module]]
name = "ForbiddenCall"
id = "no-panics"
severity = "warning"

[[module]]
name = "TypeName"
"#;

const LIB: &str = r#"pub struct bad_name;

pub fn long() {
    let a = 1;
    let b = 2;
    let _ = a + b;
}

pub fn risky(v: Option<u8>) -> u8 {
    v.unwrap() // treewalk: allow(no-panics)
}

pub fn risky2(v: Option<u8>) -> u8 { v.expect("boom") }
"#;

#[derive(Clone, Default)]
struct Collect(Arc<Mutex<BTreeMap<PathBuf, Vec<Violation>>>>);

impl AuditListener for Collect {
    fn add_error(&mut self, path: &Path, violation: &Violation) -> ListenerResult {
        self.0
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default()
            .push(violation.clone());
        Ok(())
    }
}

fn project() -> (tempfile::TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("lib.rs"), LIB).unwrap();
    std::fs::write(src.join("broken.rs"), "fn ok() {}\nfn (\n").unwrap();
    std::fs::write(src.join("empty.rs"), "").unwrap();
    std::fs::write(src.join("notes.txt"), "fn BAD() {}").unwrap();
    let files = ["lib.rs", "broken.rs", "empty.rs", "notes.txt"]
        .iter()
        .map(|f| src.join(f))
        .collect();
    (dir, files)
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_configured_run() {
    let (dir, files) = project();
    let config = ConfigFile::parse(CONFIG).unwrap();
    let collect = Collect::default();

    let checker = Checker::builder(Arc::new(RustLanguage::new()), registry())
        .configuration(config.to_configuration())
        .threads(config.checker.threads.unwrap_or(1))
        .basedir(dir.path())
        .filter(SuppressionCommentFilter)
        .listener(collect.clone())
        .build()
        .unwrap();

    let summary = checker.audit(&files);
    assert_eq!(summary.files_processed, 3);
    assert_eq!(summary.files_skipped, 1);
    // Two errors in lib.rs, the parse error in broken.rs; the warning
    // stays below the default fail level.
    assert_eq!(summary.error_count, 3);

    let by_file = collect.0.lock().unwrap().clone();
    let lib = &by_file[&PathBuf::from("src").join("lib.rs")];
    insta::assert_snapshot!(render(lib), @r###"
    1:5: error Name 'bad_name' must match pattern '^[A-Z][A-Za-z0-9]*$' [TypeNameCheck]
    3:5: error Function 'long' has 5 lines (max: 3) [FunctionLengthCheck]
    13:40: warning Method 'expect' must not be called [no-panics]
    "###);

    let broken = &by_file[&PathBuf::from("src").join("broken.rs")];
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].key, GENERAL_PARSE_ERROR);
    assert_eq!(broken[0].line, 2);
    assert_eq!(broken[0].source, "TreeWalker");

    assert!(!by_file.contains_key(&PathBuf::from("src").join("empty.rs")));
}

#[test]
fn test_presets_are_clean_on_idiomatic_code() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clean.rs");
    std::fs::write(
        &file,
        r#"//! A tidy module.

const LIMIT: usize = 3;

/// Sums the first few values.
pub fn sum_first(values: &[u32]) -> u32 {
    values.iter().take(LIMIT).sum()
}

pub struct Counter {
    count: u32,
}

impl Counter {
    pub fn bump(&mut self) -> Option<u32> {
        self.count = self.count.checked_add(1)?;
        Some(self.count)
    }
}
"#,
    )
    .unwrap();

    for preset in Preset::ALL {
        let checker = Checker::builder(Arc::new(RustLanguage::new()), registry())
            .configuration(preset.configuration())
            .threads(1)
            .build()
            .unwrap();
        assert_eq!(checker.process(&[file.clone()]), 0, "{}", preset.name());
    }
}
