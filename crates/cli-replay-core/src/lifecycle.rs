//! Session lifecycle
//!
//! Setup turns a validated scenario into a filesystem session: the
//! `.cli-replay/` directory, a per-session `intercept-<random>/` directory
//! of trampolines (one per distinct command the scenario expects), an
//! initialized state file, and the environment the child process should be
//! launched with. Teardown is the inverse, and idempotent.

use crate::error::{ReplayError, Result};
use crate::model::State;
use crate::validate::ValidatedScenario;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// A live session: the paths and environment setup produced, plus the
/// fields teardown needs. `cleaned` guards against double-free when both a
/// deferred cleanup and an explicit one fire.
pub struct Session {
    pub session_id: String,
    pub scenario_path: PathBuf,
    pub intercept_dir: PathBuf,
    pub state_path: PathBuf,
    pub child_env: Vec<(String, String)>,
    cleaned: AtomicBool,
}

impl Session {
    /// Idempotent teardown: remove the intercept directory and state file.
    /// Safe to call more than once, and safe to call when either is
    /// already missing.
    pub fn cleanup(&self) -> Result<()> {
        if self.cleaned.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        match std::fs::remove_dir_all(&self.intercept_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ReplayError::StateIo {
                    path: self.intercept_dir.display().to_string(),
                    message: e.to_string(),
                })
            }
        }
        crate::state::remove_state(&self.state_path)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::warn!("session cleanup on drop failed: {}", e);
        }
    }
}

/// Every distinct `argv[0]` the scenario expects to intercept, in first-seen
/// order.
fn distinct_commands(validated: &ValidatedScenario) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut commands = Vec::new();
    for step in &validated.flat_steps {
        if let Some(crate::model::PatternElement::Literal(first)) = step.match_.argv.first() {
            if seen.insert(first.clone()) {
                commands.push(first.clone());
            }
        }
    }
    commands
}

/// Check every command the scenario references against the allowlist: the
/// intersection of `meta.security.allowed_commands` and any
/// externally-provided list. Either list being absent
/// (`None`) means that restriction does not apply; both empty with steps
/// present means nothing is admitted.
fn check_allowlist(
    commands: &[String],
    scenario_allowed: Option<&[String]>,
    external_allowed: Option<&[String]>,
) -> Result<()> {
    for command in commands {
        if let Some(allowed) = scenario_allowed {
            if !allowed.iter().any(|c| c == command) {
                return Err(ReplayError::AllowlistViolation {
                    command: command.clone(),
                });
            }
        }
        if let Some(allowed) = external_allowed {
            if !allowed.iter().any(|c| c == command) {
                return Err(ReplayError::AllowlistViolation {
                    command: command.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Install a trampoline for `command` under `intercept_dir`, pointing at
/// `tool_binary`: a symlink on Unix, a side-by-side copy
/// on Windows since Windows lacks a portable unprivileged symlink.
fn install_trampoline(intercept_dir: &Path, command: &str, tool_binary: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let target = intercept_dir.join(command);
        std::os::unix::fs::symlink(tool_binary, &target).map_err(|e| ReplayError::StateIo {
            path: target.display().to_string(),
            message: format!("failed to create trampoline symlink: {}", e),
        })
    }
    #[cfg(windows)]
    {
        let target = intercept_dir.join(format!("{}.exe", command));
        std::fs::copy(tool_binary, &target)
            .map(|_| ())
            .map_err(|e| ReplayError::StateIo {
                path: target.display().to_string(),
                message: format!("failed to copy trampoline binary: {}", e),
            })
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (intercept_dir, command, tool_binary);
        Err(ReplayError::StateIo {
            path: intercept_dir.display().to_string(),
            message: "trampolines are only supported on unix and windows".to_string(),
        })
    }
}

/// Set up a new session for `validated`. `scenario_hash`
/// and `scenario_path` come from the caller, which already loaded the
/// scenario to validate it. `tool_binary` is the path to the binary every
/// trampoline should forward to (the replay engine's own executable,
/// re-entered via `argv[0]` detection).
pub fn setup(
    validated: &ValidatedScenario,
    scenario_path: &Path,
    scenario_hash: String,
    session_id: String,
    tool_binary: &Path,
    external_allowed_commands: Option<&[String]>,
) -> Result<Session> {
    let commands = distinct_commands(validated);
    let scenario_allowed = validated
        .scenario
        .meta
        .security
        .as_ref()
        .map(|s| s.allowed_commands.as_slice());
    check_allowlist(&commands, scenario_allowed, external_allowed_commands)?;

    let replay_dir = crate::state::replay_dir(scenario_path);
    std::fs::create_dir_all(&replay_dir).map_err(|e| ReplayError::StateIo {
        path: replay_dir.display().to_string(),
        message: e.to_string(),
    })?;

    if let Some(session) = &validated.scenario.meta.session {
        if let Some(ttl) = &session.ttl {
            if let Ok(duration) = crate::duration::parse_duration(ttl) {
                if let Err(e) = crate::ttl::clean_dir(&replay_dir, duration) {
                    tracing::warn!("TTL cleanup at session start failed: {}", e);
                }
            }
        }
    }

    let suffix = cli_replay_shared::generate_session_id();
    let intercept_dir = replay_dir.join(format!("intercept-{}", suffix));
    std::fs::create_dir_all(&intercept_dir).map_err(|e| ReplayError::StateIo {
        path: intercept_dir.display().to_string(),
        message: e.to_string(),
    })?;
    for command in &commands {
        install_trampoline(&intercept_dir, command, tool_binary)?;
    }

    let state_path = crate::state::state_file_path(scenario_path, &session_id);
    let mut state = State::new(
        scenario_path.to_path_buf(),
        scenario_hash,
        validated.total_steps(),
    );
    state.intercept_dir = Some(intercept_dir.clone());
    crate::state::write_state(&state_path, &state)?;

    let absolute_scenario = std::fs::canonicalize(scenario_path).unwrap_or_else(|_| scenario_path.to_path_buf());
    let path_sep = if cfg!(windows) { ';' } else { ':' };
    let existing_path = std::env::var("PATH").unwrap_or_default();
    let new_path = format!("{}{}{}", intercept_dir.display(), path_sep, existing_path);

    let child_env = vec![
        ("PATH".to_string(), new_path),
        (
            "CLI_REPLAY_SCENARIO".to_string(),
            absolute_scenario.display().to_string(),
        ),
        ("CLI_REPLAY_SESSION".to_string(), session_id.clone()),
    ];

    Ok(Session {
        session_id,
        scenario_path: scenario_path.to_path_buf(),
        intercept_dir,
        state_path,
        child_env,
        cleaned: AtomicBool::new(false),
    })
}
