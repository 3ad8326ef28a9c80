//! CLI integration tests for the `cli-replay` binary
//!
//! Each module exercises one subcommand end to end against a real scenario
//! file and a real (trampolined) child process, driving the binary with
//! `assert_cmd` + `predicates`.

mod check_command_test;
mod clean_command_test;
mod error_handling_test;
mod run_command_test;
mod verify_command_test;
