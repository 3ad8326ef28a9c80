//! CLI integration tests for `cli-replay check`

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
fn check_prints_flattened_steps_and_bounds() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "check-preview"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0 }

[[steps]]
match = { argv = ["echo", "b"] }
respond = { exit = 0 }
calls = { min = 2 }
"#,
    );

    cli_replay_cmd()
        .arg("check")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("check-preview"))
        .stdout(predicate::str::contains("2 step(s)"))
        .stdout(predicate::str::contains("calls 2.."));
}

#[test]
fn check_does_not_create_a_session_directory() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "no-session-side-effect"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0 }
"#,
    );

    cli_replay_cmd()
        .arg("check")
        .arg(&scenario)
        .assert()
        .success();

    assert!(
        !temp_dir.path().join(".cli-replay").exists(),
        "check must not set up a session"
    );
}

#[test]
fn check_reports_validation_failure_for_duplicate_capture_identifiers() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "bad-captures"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0, capture = { dup = "a" } }

[[steps]]
match = { argv = ["echo", "b"] }
respond = { exit = 0, capture = { dup = "b" } }
"#,
    );

    cli_replay_cmd()
        .arg("check")
        .arg(&scenario)
        .assert()
        .failure();
}
