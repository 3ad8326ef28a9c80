//! `cli-replay run <scenario> -- <command> [args...]`
//!
//! Sets up a session, spawns the command under supervision,
//! verifies the final state, reports it, and tears the session down.
//! Exit-code policy: the child's own non-zero exit (or
//! signal death) always wins over a verification failure.

use cli_replay_core::error::{ReplayError, Result};
use cli_replay_core::report::{self, ReportFormat};
use cli_replay_core::{lifecycle, state, supervisor, validate, verify};
use std::collections::HashMap;
use std::path::Path;

pub fn execute(
    scenario_path: &Path,
    session: Option<String>,
    command: &[String],
    format: ReportFormat,
) -> Result<()> {
    let session_id = session.unwrap_or_else(cli_replay_shared::generate_session_id);

    let scenario = validate::load(scenario_path)?;
    let validated = validate::validate(scenario, scenario_path)?;
    let scenario_hash = state::hash_scenario_file(scenario_path)?;
    let tool_binary = std::env::current_exe().map_err(|e| ReplayError::StateIo {
        path: "<current exe>".to_string(),
        message: e.to_string(),
    })?;

    let session = lifecycle::setup(
        &validated,
        scenario_path,
        scenario_hash,
        session_id.clone(),
        &tool_binary,
        None,
    )?;

    let (command_name, args) = command
        .split_first()
        .expect("clap requires at least one token in `command`");
    let env: HashMap<String, String> = session.child_env.iter().cloned().collect();

    let outcome = supervisor::spawn_and_supervise(command_name, args, &env, None);

    let child_outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            session.cleanup()?;
            return Err(e);
        }
    };

    let final_state = state::read_state(&session.state_path)?.unwrap_or_else(|| {
        cli_replay_core::model::State::new(
            scenario_path.to_path_buf(),
            String::new(),
            validated.total_steps(),
        )
    });
    let result = verify::verify(&validated, &final_state, &session_id);
    println!("{}", report::render(&result, format));

    session.cleanup()?;

    let child_code = child_outcome.exit_code();
    let exit_code = if child_code != 0 {
        child_code
    } else if !result.passed {
        1
    } else {
        0
    };
    std::process::exit(exit_code);
}
