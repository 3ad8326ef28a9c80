//! TTL cleaner
//!
//! Deletes expired session state (and the intercept directory it
//! references) from a single `.cli-replay/` directory, or walks a tree of
//! them in recursive mode.

use crate::error::Result;
use crate::model::State;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SKIP_DIR_NAMES: &[&str] = &[".git", "node_modules", "vendor", ".terraform", "__pycache__"];

/// Summary of one cleanup pass, returned so the CLI can report what
/// happened without re-deriving it from log lines.
#[derive(Debug, Default, Clone)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl CleanupReport {
    fn merge(&mut self, other: CleanupReport) {
        self.removed.extend(other.removed);
        self.warnings.extend(other.warnings);
    }
}

/// Clean expired sessions in a single `.cli-replay/` directory.
/// `replay_dir` not existing is not an error — there is simply nothing to
/// clean.
pub fn clean_dir(replay_dir: &Path, ttl: Duration) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    let entries = match std::fs::read_dir(replay_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
        Err(e) => {
            report
                .warnings
                .push(format!("could not read {}: {}", replay_dir.display(), e));
            return Ok(report);
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_state_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("cli-replay-") && n.ends_with(".state"))
            .unwrap_or(false);
        if !is_state_file {
            continue;
        }

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                report
                    .warnings
                    .push(format!("could not read {}: {}", path.display(), e));
                continue;
            }
        };

        let state: State = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                report.warnings.push(format!(
                    "skipping unparseable state file {}: {}",
                    path.display(),
                    e
                ));
                continue;
            }
        };

        let age = chrono::Utc::now().signed_duration_since(state.last_updated);
        if age < chrono::Duration::zero() {
            report.warnings.push(format!(
                "state file {} has a last_updated timestamp in the future; treating as active",
                path.display()
            ));
            continue;
        }

        let age = age
            .to_std()
            .unwrap_or(Duration::ZERO);
        if age <= ttl {
            continue;
        }

        if let Some(intercept_dir) = &state.intercept_dir {
            let _ = std::fs::remove_dir_all(intercept_dir);
            report.removed.push(intercept_dir.clone());
        }
        if std::fs::remove_file(&path).is_ok() {
            report.removed.push(path);
        }
    }

    Ok(report)
}

/// Walk `root`, applying [`clean_dir`] to every `.cli-replay/` directory
/// found, skipping well-known dependency/VCS directories. A permission
/// error on one subtree is recorded as a warning and does not halt the
/// walk.
pub fn clean_recursive(root: &Path, ttl: Duration) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    let walker = walkdir::WalkDir::new(root).into_iter().filter_entry(|entry| {
        if !entry.file_type().is_dir() {
            return true;
        }
        match entry.file_name().to_str() {
            Some(name) => !SKIP_DIR_NAMES.contains(&name),
            None => true,
        }
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report
                    .warnings
                    .push(format!("permission error while walking: {}", e));
                continue;
            }
        };
        if entry.file_type().is_dir() && entry.file_name() == ".cli-replay" {
            let sub = clean_dir(entry.path(), ttl)?;
            report.merge(sub);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state;
    use std::path::PathBuf;

    fn expired_state(total_steps: usize, age: chrono::Duration) -> State {
        let mut s = State::new(PathBuf::from("scenario.toml"), "hash".to_string(), total_steps);
        s.last_updated = chrono::Utc::now() - age;
        s
    }

    #[test]
    fn removes_state_past_ttl_and_its_intercept_dir() {
        let dir = tempfile::tempdir().unwrap();
        let replay_dir = dir.path().join(".cli-replay");
        std::fs::create_dir_all(&replay_dir).unwrap();
        let intercept_dir = replay_dir.join("intercept-abc");
        std::fs::create_dir_all(&intercept_dir).unwrap();

        let mut s = expired_state(1, chrono::Duration::hours(2));
        s.intercept_dir = Some(intercept_dir.clone());
        let state_path = replay_dir.join("cli-replay-deadbeef.state");
        state::write_state(&state_path, &s).unwrap();

        let report = clean_dir(&replay_dir, Duration::from_secs(3600)).unwrap();
        assert!(!state_path.exists());
        assert!(!intercept_dir.exists());
        assert_eq!(report.removed.len(), 2);
    }

    #[test]
    fn leaves_fresh_state_alone() {
        let dir = tempfile::tempdir().unwrap();
        let replay_dir = dir.path().join(".cli-replay");
        std::fs::create_dir_all(&replay_dir).unwrap();
        let s = expired_state(1, chrono::Duration::seconds(1));
        let state_path = replay_dir.join("cli-replay-deadbeef.state");
        state::write_state(&state_path, &s).unwrap();

        let report = clean_dir(&replay_dir, Duration::from_secs(3600)).unwrap();
        assert!(state_path.exists());
        assert!(report.removed.is_empty());
    }

    #[test]
    fn unparseable_state_file_is_a_warning_not_a_removal() {
        let dir = tempfile::tempdir().unwrap();
        let replay_dir = dir.path().join(".cli-replay");
        std::fs::create_dir_all(&replay_dir).unwrap();
        let state_path = replay_dir.join("cli-replay-bad.state");
        std::fs::write(&state_path, "{ not json").unwrap();

        let report = clean_dir(&replay_dir, Duration::from_secs(1)).unwrap();
        assert!(state_path.exists());
        assert_eq!(report.removed.len(), 0);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn missing_replay_dir_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".cli-replay");
        let report = clean_dir(&missing, Duration::from_secs(1)).unwrap();
        assert!(report.removed.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn recursive_mode_skips_vendor_directories() {
        let dir = tempfile::tempdir().unwrap();
        let vendored = dir.path().join("vendor/.cli-replay");
        std::fs::create_dir_all(&vendored).unwrap();
        let s = expired_state(1, chrono::Duration::hours(2));
        let state_path = vendored.join("cli-replay-deadbeef.state");
        state::write_state(&state_path, &s).unwrap();

        let report = clean_recursive(dir.path(), Duration::from_secs(3600)).unwrap();
        assert!(state_path.exists());
        assert!(report.removed.is_empty());
    }
}
