//! CLI integration tests for error reporting and exit codes
//!
//! Verifies that the error taxonomy surfaces clearly at the process
//! boundary, checking stderr/exit-code behavior rather than internal
//! error types.

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

#[test]
fn unknown_subcommand_shows_clap_usage_error() {
    cli_replay_cmd()
        .arg("nonexistent-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized").or(predicate::str::contains("error")));
}

#[test]
fn missing_scenario_file_reports_scenario_load_error() {
    let temp_dir = setup_test_dir();
    let missing = temp_dir.path().join("does-not-exist.toml");

    cli_replay_cmd()
        .arg("run")
        .arg(&missing)
        .arg("--")
        .arg("echo")
        .arg("hi")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cli-replay"));
}

#[test]
fn malformed_toml_reports_parse_error() {
    let temp_dir = setup_test_dir();
    let malformed = temp_dir.path().join("malformed.toml");
    fs::write(&malformed, "[meta\nname = broken").expect("Failed to write malformed file");

    cli_replay_cmd()
        .arg("check")
        .arg(&malformed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cli-replay"));
}

#[test]
fn scenario_missing_meta_name_fails_validation() {
    let temp_dir = setup_test_dir();
    let scenario = temp_dir.path().join("no-name.toml");
    fs::write(
        &scenario,
        r#"
[meta]
name = ""

[[steps]]
match = { argv = ["echo", "x"] }
respond = { exit = 0 }
"#,
    )
    .expect("Failed to write scenario file");

    cli_replay_cmd()
        .arg("check")
        .arg(&scenario)
        .assert()
        .failure();
}

#[test]
fn argv_mismatch_against_an_unscripted_command_fails() {
    let temp_dir = setup_test_dir();
    let scenario = temp_dir.path().join("scenario.toml");
    fs::write(
        &scenario,
        r#"
[meta]
name = "argv-mismatch"

[[steps]]
match = { argv = ["echo", "expected"] }
respond = { exit = 0, stdout = "expected\n" }
"#,
    )
    .expect("Failed to write scenario file");

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--")
        .arg("echo")
        .arg("unexpected")
        .assert()
        .failure();
}

#[test]
fn invalid_format_value_is_rejected_by_clap() {
    let temp_dir = setup_test_dir();
    let scenario = temp_dir.path().join("scenario.toml");
    fs::write(
        &scenario,
        r#"
[meta]
name = "format-check"

[[steps]]
match = { argv = ["echo", "x"] }
respond = { exit = 0 }
"#,
    )
    .expect("Failed to write scenario file");

    cli_replay_cmd()
        .arg("run")
        .arg(&scenario)
        .arg("--format")
        .arg("yaml")
        .arg("--")
        .arg("echo")
        .arg("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn error_output_goes_to_stderr_not_stdout() {
    let output = cli_replay_cmd()
        .arg("nonexistent-command")
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty(), "expected diagnostics on stderr");
}

#[test]
fn verify_without_a_prior_run_reports_state_not_found() {
    let temp_dir = setup_test_dir();
    let scenario = temp_dir.path().join("scenario.toml");
    fs::write(
        &scenario,
        r#"
[meta]
name = "verify-missing-state"

[[steps]]
match = { argv = ["echo", "x"] }
respond = { exit = 0 }
"#,
    )
    .expect("Failed to write scenario file");

    cli_replay_cmd()
        .current_dir(temp_dir.path())
        .arg("verify")
        .arg(&scenario)
        .assert()
        .failure();
}
