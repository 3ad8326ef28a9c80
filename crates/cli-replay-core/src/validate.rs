//! Scenario validation, flattening, and group-range precomputation
//!
//! [`load`] reads and parses a scenario file; [`validate`] checks every
//! declared invariant and, on success, returns a [`ValidatedScenario`]
//! carrying the precomputed flat step list, group ranges, and a capture
//! index ready for the replay engine.

use crate::error::{ReplayError, Result};
use crate::model::{GroupRange, PatternElement, Scenario, Step, StepElement};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// A scenario after successful validation, with the views the replay
/// engine needs to operate without re-deriving them on every call.
#[derive(Debug, Clone)]
pub struct ValidatedScenario {
    pub scenario: Scenario,
    pub flat_steps: Vec<Step>,
    pub group_ranges: Vec<GroupRange>,
}

impl ValidatedScenario {
    /// The group range containing `flat_index`, if any.
    pub fn group_containing(&self, flat_index: usize) -> Option<&GroupRange> {
        self.group_ranges.iter().find(|g| g.contains(flat_index))
    }

    pub fn total_steps(&self) -> usize {
        self.flat_steps.len()
    }
}

fn capture_identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Load a scenario from a TOML byte stream. Parsing itself is an external
/// collaborator's concern; this function only turns bytes into
/// the [`Scenario`] shape and wraps I/O/parse failures as
/// [`ReplayError::ScenarioLoad`].
pub fn load(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|source| ReplayError::ScenarioLoad {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ReplayError::ScenarioLoad {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
    })
}

/// Validate `scenario` (loaded from `scenario_path`, used to resolve
/// relative `stdout_file`/`stderr_file` references) and, on success,
/// produce the flattened view the replay engine consumes.
pub fn validate(scenario: Scenario, scenario_path: &Path) -> Result<ValidatedScenario> {
    let mut violations = Vec::new();

    if scenario.meta.name.trim().is_empty() {
        violations.push("meta.name must be non-empty".to_string());
    }

    if let Some(security) = &scenario.meta.security {
        for pattern in &security.deny_env_vars {
            if pattern.is_empty() {
                violations.push("security.deny_env_vars entries must be non-empty".to_string());
            }
        }
    }

    if let Some(session) = &scenario.meta.session {
        if let Some(ttl) = &session.ttl {
            if let Err(e) = crate::duration::parse_duration(ttl) {
                violations.push(format!("session.ttl is not a valid duration: {}", e));
            }
        }
    }

    let (flat_steps, group_ranges) = flatten(&scenario.steps);

    let mut seen_captures: HashSet<String> = HashSet::new();
    for (idx, step) in flat_steps.iter().enumerate() {
        validate_step(idx, step, scenario_path, &mut violations);
        for key in step.respond.capture.keys() {
            if !capture_identifier_pattern().is_match(key) {
                violations.push(format!(
                    "capture identifier '{}' (step {}) is not a valid identifier",
                    key, idx
                ));
            }
            if scenario.meta.vars.contains_key(key) {
                violations.push(format!(
                    "capture identifier '{}' (step {}) collides with a meta.vars key",
                    key, idx
                ));
            }
            if !seen_captures.insert(key.clone()) {
                violations.push(format!(
                    "capture identifier '{}' (step {}) is declared more than once",
                    key, idx
                ));
            }
        }
    }

    validate_forward_references(&flat_steps, &group_ranges, &mut violations);

    if !violations.is_empty() {
        return Err(ReplayError::ScenarioValidation { violations });
    }

    Ok(ValidatedScenario {
        scenario,
        flat_steps,
        group_ranges,
    })
}

fn validate_step(idx: usize, step: &Step, scenario_path: &Path, violations: &mut Vec<String>) {
    if step.match_.argv.is_empty() {
        violations.push(format!("step {} has an empty match.argv", idx));
    }

    if !(0..=255).contains(&step.respond.exit) {
        violations.push(format!(
            "step {} respond.exit {} is out of range [0, 255]",
            idx, step.respond.exit
        ));
    }

    match (&step.respond.stdout, &step.respond.stdout_file) {
        (Some(_), Some(_)) => violations.push(format!(
            "step {} sets both respond.stdout and respond.stdout_file",
            idx
        )),
        _ => {}
    }
    match (&step.respond.stderr, &step.respond.stderr_file) {
        (Some(_), Some(_)) => violations.push(format!(
            "step {} sets both respond.stderr and respond.stderr_file",
            idx
        )),
        _ => {}
    }

    if let Some(calls) = &step.calls {
        let min = calls.min.unwrap_or(1);
        let max = calls.max.unwrap_or(0);
        if max != 0 && max < min {
            violations.push(format!(
                "step {} calls.max ({}) is less than calls.min ({})",
                idx, max, min
            ));
        }
    }

    let base = scenario_path.parent().unwrap_or_else(|| Path::new("."));
    if let Some(stdout_file) = &step.respond.stdout_file {
        if !base.join(stdout_file).exists() {
            violations.push(format!(
                "step {} stdout_file '{}' does not exist relative to the scenario",
                idx,
                stdout_file.display()
            ));
        }
    }
    if let Some(stderr_file) = &step.respond.stderr_file {
        if !base.join(stderr_file).exists() {
            violations.push(format!(
                "step {} stderr_file '{}' does not exist relative to the scenario",
                idx,
                stderr_file.display()
            ));
        }
    }
}

/// For each `{{ .capture.X }}` reference appearing in a step's response,
/// the declaring step must have an index `<= N` in the flat list, or both
/// steps lie in the same group.
fn validate_forward_references(
    flat_steps: &[Step],
    group_ranges: &[GroupRange],
    violations: &mut Vec<String>,
) {
    let mut declared_at: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for (idx, step) in flat_steps.iter().enumerate() {
        for key in step.respond.capture.keys() {
            declared_at.insert(key.as_str(), idx);
        }
    }

    let group_containing = |flat_index: usize| -> Option<&GroupRange> {
        group_ranges.iter().find(|g| g.contains(flat_index))
    };

    for (idx, step) in flat_steps.iter().enumerate() {
        for reference in extract_capture_references(step) {
            let Some(&declared_idx) = declared_at.get(reference.as_str()) else {
                // Unknown capture identifiers render empty at runtime;
                // this is not a validation error.
                continue;
            };
            if declared_idx <= idx {
                continue;
            }
            let same_group = match (group_containing(idx), group_containing(declared_idx)) {
                (Some(a), Some(b)) => std::ptr::eq(a, b),
                _ => false,
            };
            if !same_group {
                violations.push(format!(
                    "step {} references capture.{} declared later at step {} outside any shared group",
                    idx, reference, declared_idx
                ));
            }
        }
    }
}

fn extract_capture_references(step: &Step) -> Vec<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"\{\{-?\s*\.capture\.([A-Za-z_][A-Za-z0-9_]*)\s*-?\}\}").expect("valid regex")
    });
    let mut refs = Vec::new();
    for text in [step.respond.stdout.as_deref(), step.respond.stderr.as_deref()]
        .into_iter()
        .flatten()
    {
        for caps in pattern.captures_iter(text) {
            refs.push(caps[1].to_string());
        }
    }
    refs
}

/// Flatten the scenario's top-level `steps` (a mix of bare steps and
/// groups) into a single declaration-order list, plus the contiguous
/// ranges each group occupies within it.
fn flatten(elements: &[StepElement]) -> (Vec<Step>, Vec<GroupRange>) {
    let mut flat = Vec::new();
    let mut ranges = Vec::new();

    for (top_index, element) in elements.iter().enumerate() {
        match element {
            StepElement::Step(step) => flat.push(step.clone()),
            StepElement::Group { group } => {
                let start = flat.len();
                flat.extend(group.steps.iter().cloned());
                ranges.push(GroupRange {
                    start,
                    end_exclusive: flat.len(),
                    name: group.name.clone(),
                    mode: group.mode,
                    top_index,
                });
            }
        }
    }

    (flat, ranges)
}

/// Whether a pattern element is syntactically a regex, used only by
/// diagnostics that want to label a position's kind without re-deriving it
/// from [`crate::matcher::element_details`].
pub fn pattern_kind(pattern: &PatternElement) -> &'static str {
    match pattern {
        PatternElement::Literal(_) => "literal",
        PatternElement::Wildcard => "wildcard",
        PatternElement::Regex(_) => "regex",
    }
}
