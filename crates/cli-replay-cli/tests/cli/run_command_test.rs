//! CLI integration tests for `cli-replay run`
//!
//! Drives the real binary against a temp-directory scenario and a
//! trampolined real command, using `assert_cmd` + `tempfile`.

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
fn run_command_replays_a_single_matching_step() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "single-step"

[[steps]]
match = { argv = ["echo", "hello"] }
respond = { exit = 0, stdout = "hello-from-replay\n" }
"#,
    );

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--")
        .arg("echo")
        .arg("hello")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn run_command_fails_when_a_step_is_never_called() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "two-steps"

[[steps]]
match = { argv = ["echo", "first"] }
respond = { exit = 0, stdout = "first\n" }

[[steps]]
match = { argv = ["echo", "second"] }
respond = { exit = 0, stdout = "second\n" }
"#,
    );

    // Only the first step is ever invoked; the second's min=1 is unmet.
    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--")
        .arg("echo")
        .arg("first")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"));
}

#[test]
fn run_command_propagates_child_exit_code_over_verification() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "nonzero-exit"

[[steps]]
match = { argv = ["sh", "-c", "exit 7"] }
respond = { exit = 7 }
"#,
    );

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--")
        .arg("sh")
        .arg("-c")
        .arg("exit 7")
        .assert()
        .code(7);
}

#[test]
fn run_command_supports_json_format() {
    let temp_dir = setup_test_dir();
    let scenario = write_scenario(
        temp_dir.path(),
        "scenario.toml",
        r#"
[meta]
name = "json-format"

[[steps]]
match = { argv = ["echo", "x"] }
respond = { exit = 0, stdout = "x\n" }
"#,
    );

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--format")
        .arg("json")
        .arg("--")
        .arg("echo")
        .arg("x")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"passed\": true"));
}

