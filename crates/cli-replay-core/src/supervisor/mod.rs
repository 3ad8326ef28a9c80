//! Process supervisor
//!
//! Spawns the child under test, forwards terminating signals to its whole
//! process tree, waits for it, and maps the outcome to a POSIX-convention
//! exit code. The parent itself stays single-threaded except for the
//! signal-forwarding loop, which runs as a background task that exits
//! once cleanup has run.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

use crate::error::{ReplayError, Result};
use std::collections::HashMap;
use std::path::Path;

/// What the supervisor actually observed happen to the child, independent
/// of how that maps to an exit code — kept separate so callers (the CLI)
/// can log the distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOutcome {
    Exited(i32),
    KilledBySignal(i32),
}

impl ChildOutcome {
    /// POSIX-convention exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ChildOutcome::Exited(code) => *code,
            ChildOutcome::KilledBySignal(sig) => 128 + sig,
        }
    }
}

/// Spawn `command` with `args` and `env` added to the inherited
/// environment, supervise it to completion, and return its outcome.
///
/// `on_spawned` is invoked with the child's process id once spawn
/// succeeds, before the supervisor blocks waiting for exit — callers use
/// this to log or to arm their own cleanup-on-panic guard.
pub fn spawn_and_supervise(
    command: &str,
    args: &[String],
    env: &HashMap<String, String>,
    cwd: Option<&Path>,
) -> Result<ChildOutcome> {
    #[cfg(unix)]
    {
        unix::spawn_and_supervise(command, args, env, cwd)
    }
    #[cfg(windows)]
    {
        windows::spawn_and_supervise(command, args, env, cwd)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (command, args, env, cwd);
        Err(ReplayError::ChildSpawn {
            command: command.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "process supervision is only implemented for unix and windows",
            ),
        })
    }
}

/// Classify a spawn failure into the 126/127 split: "not found" is 127,
/// "found but not executable" is 126. Other I/O errors
/// surface as a generic [`ReplayError::ChildSpawn`] (exit 1 via its
/// `exit_code`, overridden by the CLI for these two well-known cases).
pub(crate) fn classify_spawn_error(command: &str, error: std::io::Error) -> ReplayError {
    match error.kind() {
        std::io::ErrorKind::NotFound => ReplayError::ChildSpawn {
            command: command.to_string(),
            source: error,
        },
        std::io::ErrorKind::PermissionDenied => ReplayError::ChildExit {
            message: format!("'{}' found but not executable: {}", command, error),
        },
        _ => ReplayError::ChildSpawn {
            command: command.to_string(),
            source: error,
        },
    }
}
