//! Trampoline entrypoint
//!
//! When this binary is invoked under a target command's name (via the
//! symlink/copy `cli-replay-core::lifecycle` installed in the intercept
//! directory), it never reaches the `clap` parser in [`crate::cli`] — it
//! resolves the scenario and session from the environment, replays one
//! step, and exits with the matched response's exit code.

use crate::color::Colorizer;
use cli_replay_core::engine::{advance, normalize_stdin, RenderInputs};
use cli_replay_core::error::ReplayError;
use cli_replay_core::{state, validate};
use std::io::{IsTerminal, Read, Write};

const TRACE_ENV: &str = "CLI_REPLAY_TRACE";

fn trace_enabled() -> bool {
    matches!(
        std::env::var(TRACE_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes") | Ok("on")
    )
}

/// Read stdin into a string if it looks redirected (not an interactive
/// terminal), so a command invoked with no piped input is told apart from
/// one piped empty input.
fn capture_stdin() -> Option<String> {
    if std::io::stdin().is_terminal() {
        return None;
    }
    let mut buf = String::new();
    match std::io::stdin().read_to_string(&mut buf) {
        Ok(_) => Some(normalize_stdin(&buf)),
        Err(_) => None,
    }
}

/// Run as a trampoline and exit the process — this function never returns.
pub fn run(received_argv: Vec<String>) -> ! {
    let exit_code = match try_run(received_argv) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format_error(&e));
            e.exit_code()
        }
    };
    std::process::exit(exit_code);
}

/// Render a replay error for the trampoline's stderr, colorizing the
/// expected/received argv on an `ArgvMismatch`
fn format_error(e: &ReplayError) -> String {
    let colorizer = Colorizer::from_env();
    match e {
        ReplayError::ArgvMismatch {
            step,
            position,
            expected,
            received,
            soft_advanced,
        } => {
            let soft = if *soft_advanced { " (soft-advanced)" } else { "" };
            format!(
                "cli-replay: argv mismatch at step {}{}, first difference at position {}\n  expected: {}\n  received: {}",
                step,
                soft,
                position,
                colorizer.green(expected),
                colorizer.red(received),
            )
        }
        other => format!("cli-replay: {}", other),
    }
}

fn try_run(received_argv: Vec<String>) -> Result<i32, ReplayError> {
    let scenario_path = std::env::var("CLI_REPLAY_SCENARIO").map_err(|_| ReplayError::StateIo {
        path: "CLI_REPLAY_SCENARIO".to_string(),
        message: "environment variable is not set".to_string(),
    })?;
    let scenario_path = std::path::PathBuf::from(scenario_path);
    let session_id = std::env::var("CLI_REPLAY_SESSION").unwrap_or_default();

    let scenario = validate::load(&scenario_path)?;
    let validated = validate::validate(scenario, &scenario_path)?;
    let scenario_hash = state::hash_scenario_file(&scenario_path)?;

    let state_path = state::state_file_path(&scenario_path, &session_id);
    let mut session_state = match state::read_state(&state_path)? {
        Some(state) => state,
        None => cli_replay_core::model::State::new(
            scenario_path.clone(),
            scenario_hash,
            validated.total_steps(),
        ),
    };

    let scenario_dir = scenario_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."))
        .to_path_buf();
    let inputs = RenderInputs {
        scenario_dir: &scenario_dir,
        env: std::env::vars().collect(),
    };

    let stdin = capture_stdin();
    let outcome = advance(
        &validated,
        &mut session_state,
        &received_argv,
        stdin.as_deref(),
        &inputs,
    )?;

    state::write_state(&state_path, &session_state)?;

    std::io::stdout()
        .write_all(&outcome.stdout)
        .map_err(|e| ReplayError::StateIo {
            path: "<stdout>".to_string(),
            message: e.to_string(),
        })?;
    std::io::stderr()
        .write_all(&outcome.stderr)
        .map_err(|e| ReplayError::StateIo {
            path: "<stderr>".to_string(),
            message: e.to_string(),
        })?;

    if trace_enabled() {
        eprintln!(
            "[cli-replay] step={} argv={:?} exit={}",
            outcome.matched_step, received_argv, outcome.exit_code
        );
        let denied = cli_replay_core::engine::denied_env_vars(
            &validated,
            &session_state.captures,
            std::env::vars().collect(),
        )
        .unwrap_or_default();
        for name in denied {
            eprintln!("cli-replay[trace]: denied env var {}", name);
        }
    }

    Ok(outcome.exit_code)
}
