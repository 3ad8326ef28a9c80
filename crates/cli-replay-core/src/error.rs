//! Error types for the replay core
//!
//! One variant per row of the error taxonomy table, each carrying the
//! structured context its reporter needs rather than a single opaque
//! string. The replay engine never panics on user input (malformed
//! scenarios, mismatched argv, unreadable files); every failure path
//! returns one of these variants and `?`-propagates to the CLI, which
//! converts it to a stderr diagnostic and an exit code.

use thiserror::Error;

/// Errors produced anywhere in the replay core.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to load scenario from {path}: {source}")]
    ScenarioLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scenario validation failed with {} violation(s):\n{}", violations.len(), violations.join("\n"))]
    ScenarioValidation { violations: Vec<String> },

    #[error("argv mismatch at step {step}: first difference at position {position}")]
    ArgvMismatch {
        step: usize,
        position: usize,
        expected: String,
        received: String,
        soft_advanced: bool,
    },

    #[error("stdin mismatch at step {step}")]
    StdinMismatch { step: usize, preview: String },

    #[error("no candidate in group '{group}' matched the received argv")]
    GroupMismatch {
        group: String,
        candidates: Vec<usize>,
    },

    #[error("scenario is already complete (all {total_steps} steps exhausted)")]
    ScenarioComplete { total_steps: usize },

    #[error("command '{command}' is not in the allowlist")]
    AllowlistViolation { command: String },

    #[error("failed to render response: {0}")]
    ResponseRender(#[from] cli_replay_template::TemplateError),

    #[error("failed to read file-backed response at {path}: {source}")]
    FileBackedResponse {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session state I/O error at {path}: {message}")]
    StateIo { path: String, message: String },

    #[error("failed to spawn child process '{command}': {source}")]
    ChildSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("child process exited abnormally: {message}")]
    ChildExit { message: String },

    #[error("verification failed: {unmet} of {total_steps} step(s) below their minimum call count")]
    VerificationFailure { unmet: usize, total_steps: usize },
}

pub type Result<T> = std::result::Result<T, ReplayError>;

impl ReplayError {
    /// The exit code the CLI should use when this error reaches the top
    /// level unhandled,'s "User visibility" column.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReplayError::ChildSpawn { .. } => 127,
            ReplayError::ChildExit { message } => {
                // Distinguish "not executable" (126) from other spawn-adjacent
                // failures surfaced after the child was observed.
                if message.contains("not executable") {
                    126
                } else {
                    1
                }
            }
            _ => 1,
        }
    }
}
