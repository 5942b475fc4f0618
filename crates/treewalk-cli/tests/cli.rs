//! End-to-end runs of the `treewalk` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn treewalk(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_treewalk"))
        .args(args)
        .current_dir(dir)
        .env("TREEWALK_CONFIG_DIR", dir.join("no-user-config"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_clean_project_exits_zero() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("lib.rs"), "pub fn add(a: u8, b: u8) -> u8 {\n    a + b\n}\n")
        .unwrap();

    let output = treewalk(tmp.path(), &["check", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_violations_exit_one() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("lib.rs"),
        "pub fn get(v: Option<u8>) -> u8 {\n    v.unwrap()\n}\n",
    )
    .unwrap();

    let output = treewalk(tmp.path(), &["check", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "lib.rs:2:7: error [ForbiddenCallCheck] Method 'unwrap' must not be called\n"
    );
}

#[test]
fn test_project_config_and_json() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("treewalk.toml"),
        "[checker]\nfail_on = \"error\"\n\n[[module]]\nname = \"TypeName\"\nseverity = \"warning\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("lib.rs"), "pub struct lower;\n").unwrap();

    let output = treewalk(tmp.path(), &["check", "--format", "json"]);
    // Warnings are below the failure threshold.
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["files"][0]["path"], "lib.rs");
    assert_eq!(report["files"][0]["violations"][0]["severity"], "warning");
    assert_eq!(report["summary"]["violation_count"], 1);
    assert_eq!(report["summary"]["error_count"], 0);
}

#[test]
fn test_configured_extensions_drive_discovery() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("treewalk.toml"),
        "[checker]\nfile_extensions = [\".txt\"]\n\n[[module]]\nname = \"ForbiddenCall\"\n",
    )
    .unwrap();
    let code = "fn get(v: Option<u8>) -> u8 {\n    v.unwrap()\n}\n";
    fs::write(tmp.path().join("snippet.txt"), code).unwrap();
    fs::write(tmp.path().join("lib.rs"), code).unwrap();

    let output = treewalk(tmp.path(), &["check", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "snippet.txt:2:7: error [ForbiddenCallCheck] Method 'unwrap' must not be called\n"
    );
}

#[test]
fn test_suppress_entries_drop_matching_violations() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("treewalk.toml"),
        "[[module]]\nname = \"ForbiddenCall\"\n\n[[suppress]]\nfiles = \"^gen\"\nchecks = \"ForbiddenCall\"\n",
    )
    .unwrap();
    let code = "fn get(v: Option<u8>) -> u8 {\n    v.unwrap()\n}\n";
    fs::create_dir(tmp.path().join("gen")).unwrap();
    fs::write(tmp.path().join("gen").join("out.rs"), code).unwrap();
    fs::write(tmp.path().join("lib.rs"), code).unwrap();

    let output = treewalk(tmp.path(), &["check", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "lib.rs:2:7: error [ForbiddenCallCheck] Method 'unwrap' must not be called\n"
    );

    fs::write(
        tmp.path().join("treewalk.toml"),
        "[[module]]\nname = \"ForbiddenCall\"\n\n[[suppress]]\nlines = \"1-2\"\n",
    )
    .unwrap();
    let output = treewalk(tmp.path(), &["check"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_bad_config_exits_two() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("treewalk.toml"),
        "[[module]]\nname = \"NoSuchCheck\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("lib.rs"), "fn f() {}\n").unwrap();

    let output = treewalk(tmp.path(), &["check"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("NoSuchCheck"), "{stderr}");
}

#[test]
fn test_init_then_check() {
    let tmp = tempfile::tempdir().unwrap();
    assert_eq!(treewalk(tmp.path(), &["init"]).status.code(), Some(0));
    assert!(tmp.path().join("treewalk.toml").is_file());
    assert_eq!(treewalk(tmp.path(), &["init"]).status.code(), Some(2));

    fs::write(tmp.path().join("lib.rs"), "pub fn ok() {}\n").unwrap();
    let output = treewalk(tmp.path(), &["check", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(tmp.path().join(".treewalk-cache").is_file());
}

#[test]
fn test_list_checks() {
    let tmp = tempfile::tempdir().unwrap();
    let output = treewalk(tmp.path(), &["list-checks"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("NestingDepth"));
}
