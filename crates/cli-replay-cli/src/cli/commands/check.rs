//! `cli-replay check <scenario>`
//!
//! Loads and validates a scenario and prints the flattened step list
//! with group ranges and effective call bounds, without creating a
//! session — a dry-run previewer for scenario authors.

use cli_replay_core::error::Result;
use cli_replay_core::model::CallsConfig;
use cli_replay_core::validate;
use cli_replay_core::verify::argv_summary;
use std::path::Path;

pub fn execute(scenario_path: &Path) -> Result<()> {
    let scenario = validate::load(scenario_path)?;
    let validated = validate::validate(scenario, scenario_path)?;

    println!(
        "{}: {} step(s), {} group(s)",
        validated.scenario.meta.name,
        validated.total_steps(),
        validated.group_ranges.len()
    );

    for (idx, step) in validated.flat_steps.iter().enumerate() {
        let bounds = CallsConfig::effective_bounds(step.calls.as_ref());
        let max_repr = bounds
            .max
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unbounded".to_string());
        let group = validated
            .group_containing(idx)
            .map(|g| format!(" [group {}]", g.name.clone().unwrap_or_else(|| format!("#{}", g.top_index))))
            .unwrap_or_default();
        println!(
            "  {}: {} (calls {}..{}){}",
            idx,
            argv_summary(&step.match_.argv),
            bounds.min,
            max_repr,
            group
        );
    }

    Ok(())
}
