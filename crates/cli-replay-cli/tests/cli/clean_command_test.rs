//! CLI integration tests for `cli-replay clean`

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

fn cli_replay_cmd() -> Command {
    Command::cargo_bin("cli-replay").expect("Failed to find cli-replay binary")
}

fn write_scenario(dir: &std::path::Path, filename: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).expect("Failed to write scenario file");
    path
}

#[test]
fn clean_reports_zero_removed_when_nothing_expired() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "clean-empty"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0 }
"#,
    );

    cli_replay_cmd()
        .arg("clean")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 item(s) removed"));
}

#[test]
fn clean_removes_state_older_than_the_given_ttl() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "clean-expired"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0 }
"#,
    );

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--session")
        .arg("clean-expired-session")
        .arg("--")
        .arg("echo")
        .arg("a")
        .assert()
        .success();

    let replay_dir = temp_dir.path().join(".cli-replay");
    assert!(replay_dir.exists(), "run should have created session state");

    cli_replay_cmd()
        .arg("clean")
        .arg(&scenario)
        .arg("--ttl")
        .arg("0s")
        .assert()
        .success()
        .stdout(predicate::str::contains("item(s) removed"));

    let remaining: Vec<_> = fs::read_dir(&replay_dir)
        .map(|entries| entries.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(
        remaining.iter().all(|e| {
            !e.file_name()
                .to_string_lossy()
                .starts_with("cli-replay-")
        }),
        "expired state files should have been removed"
    );
}

#[test]
fn clean_recursive_walks_nested_directories() {
    let temp_dir = setup_test_dir();
    let nested = temp_dir.path().join("nested");
    fs::create_dir(&nested).expect("Failed to create nested directory");
    write_scenario(
        &nested,
        "scenario.toml",
        r#"
[meta]
name = "recursive-clean"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0 }
"#,
    );

    cli_replay_cmd()
        .arg("clean")
        .arg(temp_dir.path())
        .arg("--recursive")
        .assert()
        .success()
        .stdout(predicate::str::contains("item(s) removed"));
}
