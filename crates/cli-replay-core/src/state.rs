//! Session state store
//!
//! Per-(scenario, session) progress is persisted as JSON next to the
//! scenario file, written atomically via a temp-file-then-rename so a
//! concurrent reader never observes a torn file.

use crate::error::{ReplayError, Result};
use crate::model::State;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

/// `.cli-replay/` lives next to the scenario file and holds every session's
/// state file and intercept directory.
pub fn replay_dir(scenario_path: &Path) -> PathBuf {
    scenario_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(".cli-replay")
}

/// Derive the state-file path for `(scenario_path, session_id)`. An empty
/// `session_id` yields the sessionless path. Two distinct
/// session ids for the same scenario never collide, because
/// the hash covers both inputs with a NUL separator.
pub fn state_file_path(scenario_path: &Path, session_id: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(scenario_path.as_os_str().to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update(session_id.as_bytes());
    let digest = hasher.finalize();
    let hex = hex::encode(digest);
    let short = &hex[..16];
    replay_dir(scenario_path).join(format!("cli-replay-{}.state", short))
}

/// SHA-256 of the scenario file's raw bytes, stored in [`State::scenario_hash`]
/// so a stale state file can be told apart from a scenario that was edited
/// since the session began.
pub fn hash_scenario_file(scenario_path: &Path) -> Result<String> {
    let bytes = std::fs::read(scenario_path).map_err(|source| ReplayError::ScenarioLoad {
        path: scenario_path.display().to_string(),
        source,
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Read and deserialize a state file, distinguishing "not found" (`Ok(None)`)
/// from a malformed file (`Err`)
pub fn read_state(path: &Path) -> Result<Option<State>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ReplayError::StateIo {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };

    let mut value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| ReplayError::StateIo {
            path: path.display().to_string(),
            message: format!("malformed state file: {}", e),
        })?;

    migrate_legacy_consumed_steps(&mut value);

    let state: State = serde_json::from_value(value).map_err(|e| ReplayError::StateIo {
        path: path.display().to_string(),
        message: format!("malformed state file: {}", e),
    })?;
    Ok(Some(state))
}

/// Convert a legacy `consumed_steps: [bool, ...]` field into `step_counts`
/// positionally (`true` -> 1, `false` -> 0) when `step_counts` itself is
/// absent, then drop the legacy field.
fn migrate_legacy_consumed_steps(value: &mut serde_json::Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    if object.contains_key("step_counts") {
        object.remove("consumed_steps");
        return;
    }
    if let Some(serde_json::Value::Array(legacy)) = object.remove("consumed_steps") {
        let counts: Vec<serde_json::Value> = legacy
            .iter()
            .map(|v| {
                let consumed = v.as_bool().unwrap_or(false);
                serde_json::Value::Number(if consumed { 1.into() } else { 0.into() })
            })
            .collect();
        object.insert("step_counts".to_string(), serde_json::Value::Array(counts));
    }
}

/// Atomically persist `state` to `path`: serialize to JSON, write to
/// `<path>.tmp`, then rename over `path`. The parent directory is created
/// (`mkdir -p` equivalent) if it does not already exist.
pub fn write_state(path: &Path, state: &State) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ReplayError::StateIo {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }

    let json = serde_json::to_string_pretty(state).map_err(|e| ReplayError::StateIo {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let tmp_path = path.with_extension("state.tmp");
    {
        let mut file = std::fs::File::create(&tmp_path).map_err(|e| ReplayError::StateIo {
            path: tmp_path.display().to_string(),
            message: e.to_string(),
        })?;
        file.write_all(json.as_bytes())
            .map_err(|e| ReplayError::StateIo {
                path: tmp_path.display().to_string(),
                message: e.to_string(),
            })?;
        file.sync_all().ok();
    }

    std::fs::rename(&tmp_path, path).map_err(|e| ReplayError::StateIo {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Remove a state file if present. Missing is not an error.
pub fn remove_state(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReplayError::StateIo {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}
