//! Verifier
//!
//! Turns a [`State`] and its [`ValidatedScenario`] into a single structured
//! result; [`crate::report`] renders that result as text, JSON, or JUnit.

use crate::model::{CallsConfig, PatternElement, State};
use crate::validate::ValidatedScenario;
use serde::Serialize;

/// One flat step's outcome against its declared call bounds.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub index: usize,
    pub argv_summary: String,
    pub count: u32,
    pub min: u32,
    pub max: Option<u32>,
    pub group_name: Option<String>,
}

impl StepResult {
    fn met(&self) -> bool {
        self.count >= self.min
    }
}

/// The structured verification result.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub scenario_name: String,
    pub session_id: String,
    pub passed: bool,
    pub total_steps: usize,
    pub consumed_steps: usize,
    pub per_step: Vec<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Render one argv pattern list the way diagnostics and reports show it:
/// space-joined, `*` for wildcards, `regex:<source>` for regexes.
pub fn argv_summary(argv: &[PatternElement]) -> String {
    argv.iter()
        .map(|p| match p {
            PatternElement::Literal(s) => s.clone(),
            PatternElement::Wildcard => "*".to_string(),
            PatternElement::Regex(source) => format!("regex:{}", source),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Verify `state` against `validated`: passes iff every step's consumed
/// count meets its effective minimum.
pub fn verify(
    validated: &ValidatedScenario,
    state: &State,
    session_id: &str,
) -> VerificationResult {
    let mut per_step = Vec::with_capacity(validated.flat_steps.len());
    let mut unmet = 0usize;
    let mut consumed_steps = 0usize;

    for (idx, step) in validated.flat_steps.iter().enumerate() {
        let bounds = CallsConfig::effective_bounds(step.calls.as_ref());
        let count = state.step_counts.get(idx).copied().unwrap_or(0);
        if count > 0 {
            consumed_steps += 1;
        }
        let group_name = validated
            .group_containing(idx)
            .and_then(|g| g.name.clone());
        let result = StepResult {
            index: idx,
            argv_summary: argv_summary(&step.match_.argv),
            count,
            min: bounds.min,
            max: bounds.max,
            group_name,
        };
        if !result.met() {
            unmet += 1;
        }
        per_step.push(result);
    }

    VerificationResult {
        scenario_name: validated.scenario.meta.name.clone(),
        session_id: session_id.to_string(),
        passed: unmet == 0,
        total_steps: validated.flat_steps.len(),
        consumed_steps,
        per_step,
        error: None,
    }
}

/// A verification result for a session whose setup or replay itself failed
/// before any step could be checked, carrying the failure message through
/// to the reporters instead of a partial per-step list.
pub fn failed(scenario_name: &str, session_id: &str, total_steps: usize, error: String) -> VerificationResult {
    VerificationResult {
        scenario_name: scenario_name.to_string(),
        session_id: session_id.to_string(),
        passed: false,
        total_steps,
        consumed_steps: 0,
        per_step: Vec::new(),
        error: Some(error),
    }
}
