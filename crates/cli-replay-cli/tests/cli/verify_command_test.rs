//! CLI integration tests for `cli-replay verify`

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
fn verify_reports_pass_after_a_successful_run() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "verify-after-run"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0, stdout = "a\n" }
"#,
    );

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--session")
        .arg("verify-session")
        .arg("--")
        .arg("echo")
        .arg("a")
        .assert()
        .success();

    cli_replay_cmd()
        .arg("verify")
        .arg(&scenario)
        .arg("--session")
        .arg("verify-session")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn verify_reports_fail_when_a_required_step_was_unmet() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "verify-unmet"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0 }

[[steps]]
match = { argv = ["echo", "b"] }
respond = { exit = 0 }
"#,
    );

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--session")
        .arg("verify-unmet-session")
        .arg("--")
        .arg("echo")
        .arg("a")
        .assert()
        .failure();

    cli_replay_cmd()
        .arg("verify")
        .arg(&scenario)
        .arg("--session")
        .arg("verify-unmet-session")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"));
}

#[test]
fn verify_without_a_prior_session_reports_missing_state() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "verify-no-state"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0 }
"#,
    );

    cli_replay_cmd()
        .arg("verify")
        .arg(&scenario)
        .arg("--session")
        .arg("never-ran")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cli-replay"));
}

#[test]
fn verify_supports_json_format() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "verify-json"

[[steps]]
match = { argv = ["echo", "a"] }
respond = { exit = 0 }
"#,
    );

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--session")
        .arg("verify-json-session")
        .arg("--")
        .arg("echo")
        .arg("a")
        .assert()
        .success();

    cli_replay_cmd()
        .arg("verify")
        .arg(&scenario)
        .arg("--session")
        .arg("verify-json-session")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"passed\": true"));
}
