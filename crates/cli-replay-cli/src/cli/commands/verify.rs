//! `cli-replay verify <scenario> --session <id>`
//!
//! Reads an existing session's state and reports whether it satisfied the
//! scenario, without replaying anything.

use cli_replay_core::error::{ReplayError, Result};
use cli_replay_core::report::{self, ReportFormat};
use cli_replay_core::{state, validate, verify};
use std::path::Path;

pub fn execute(scenario_path: &Path, session_id: &str, format: ReportFormat) -> Result<()> {
    let scenario = validate::load(scenario_path)?;
    let validated = validate::validate(scenario, scenario_path)?;

    let state_path = state::state_file_path(scenario_path, session_id);
    let final_state = state::read_state(&state_path)?.ok_or_else(|| ReplayError::StateIo {
        path: state_path.display().to_string(),
        message: "no session state found; has this scenario been run yet?".to_string(),
    })?;

    let result = verify::verify(&validated, &final_state, session_id);
    println!("{}", report::render(&result, format));

    if result.passed {
        Ok(())
    } else {
        Err(ReplayError::VerificationFailure {
            unmet: result.per_step.iter().filter(|s| s.count < s.min).count(),
            total_steps: result.total_steps,
        })
    }
}
