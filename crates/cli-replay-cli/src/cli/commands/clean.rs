//! `cli-replay clean <path> [--recursive] [--ttl <duration>]`
//!
//! Single-directory mode targets one scenario's `.cli-replay/`; recursive
//! mode walks a directory tree.

use cli_replay_core::error::{ReplayError, Result};
use cli_replay_core::{duration, state, ttl, validate};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600);

fn resolve_ttl(path: &Path, override_ttl: Option<&str>) -> Result<Duration> {
    if let Some(raw) = override_ttl {
        return duration::parse_duration(raw).map_err(|message| ReplayError::ScenarioValidation {
            violations: vec![message],
        });
    }
    if path.is_file() {
        if let Ok(scenario) = validate::load(path) {
            if let Some(session) = scenario.meta.session {
                if let Some(raw) = session.ttl {
                    return duration::parse_duration(&raw).map_err(|message| {
                        ReplayError::ScenarioValidation {
                            violations: vec![message],
                        }
                    });
                }
            }
        }
    }
    Ok(DEFAULT_TTL)
}

pub fn execute(path: &Path, recursive: bool, override_ttl: Option<&str>) -> Result<()> {
    let ttl_duration = resolve_ttl(path, override_ttl)?;

    let report = if recursive {
        ttl::clean_recursive(path, ttl_duration)?
    } else {
        let replay_dir = state::replay_dir(path);
        ttl::clean_dir(&replay_dir, ttl_duration)?
    };

    for removed in &report.removed {
        println!("removed {}", removed.display());
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    println!("{} item(s) removed", report.removed.len());

    Ok(())
}
