//! Scenario and session-state data model
//!
//! Pure data types. Loading, validation, flattening, and the match/advance
//! state machine live in [`crate::validate`] and [`crate::engine`] — this
//! module only describes the shapes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A loaded scenario: `meta` plus the declared sequence of steps and
/// groups, in declaration order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    pub meta: Meta,
    #[serde(default)]
    pub steps: Vec<StepElement>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Meta {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vars: HashMap<String, String>,
    #[serde(default)]
    pub security: Option<Security>,
    #[serde(default)]
    pub session: Option<SessionMeta>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Security {
    #[serde(default)]
    pub allowed_commands: Vec<String>,
    #[serde(default)]
    pub deny_env_vars: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SessionMeta {
    pub ttl: Option<String>,
}

/// A top-level scenario element: either a single expected call or an
/// unordered group of them. No nested groups.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StepElement {
    Group { group: StepGroup },
    Step(Step),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepGroup {
    pub mode: GroupMode,
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    Unordered,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Step {
    #[serde(rename = "match")]
    pub match_: StepMatch,
    pub respond: Respond,
    #[serde(default)]
    pub calls: Option<CallsConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepMatch {
    pub argv: Vec<PatternElement>,
    #[serde(default)]
    pub stdin: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Respond {
    pub exit: i64,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub stdout_file: Option<PathBuf>,
    #[serde(default)]
    pub stderr_file: Option<PathBuf>,
    #[serde(default)]
    pub capture: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CallsConfig {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

/// One element of `match.argv`. The concrete on-disk syntax (plain string
/// vs. `*` vs. `{ regex = "..." }`) is a presentation concern handled by
/// `Deserialize`; downstream code only ever sees this tagged variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PatternElement {
    Literal(String),
    Wildcard,
    Regex(String),
}

impl<'de> Deserialize<'de> for PatternElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Regex { regex: String },
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Regex { regex } => PatternElement::Regex(regex),
            Raw::Text(text) if text == "*" => PatternElement::Wildcard,
            Raw::Text(text) => PatternElement::Literal(text),
        })
    }
}

/// A step's effective call bounds after defaults are applied. `max` is
/// `None` when unbounded (the raw `0` sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveBounds {
    pub min: u32,
    pub max: Option<u32>,
}

impl EffectiveBounds {
    pub const UNBOUNDED_SENTINEL: u32 = u32::MAX;

    /// `max` normalized to the large-sentinel representation used by the
    /// match/advance state machine.
    pub fn effective_max(&self) -> u32 {
        self.max.unwrap_or(Self::UNBOUNDED_SENTINEL)
    }
}

impl CallsConfig {
    /// Resolve this step's declared `calls` against the default bounds
    /// `{min: 1, max: 1}` applied when the `calls` block is absent
    /// entirely. When `calls` is present but partial, an
    /// omitted `min` defaults to 1 and an omitted `max` defaults to the
    /// unbounded sentinel (0) — the block's presence signals the author
    /// wants non-default behavior, so we don't silently force `max: 1`.
    pub fn effective_bounds(this: Option<&CallsConfig>) -> EffectiveBounds {
        match this {
            None => EffectiveBounds { min: 1, max: Some(1) },
            Some(cfg) => {
                let min = cfg.min.unwrap_or(1);
                let max = match cfg.max.unwrap_or(0) {
                    0 => None,
                    n => Some(n),
                };
                EffectiveBounds { min, max }
            }
        }
    }
}

/// Per (scenario, session) durable progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub scenario_path: PathBuf,
    pub scenario_hash: String,
    pub total_steps: usize,
    pub current_step: usize,
    pub step_counts: Vec<u32>,
    #[serde(default)]
    pub active_group: Option<usize>,
    #[serde(default)]
    pub captures: HashMap<String, String>,
    #[serde(default)]
    pub intercept_dir: Option<PathBuf>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl State {
    pub fn new(scenario_path: PathBuf, scenario_hash: String, total_steps: usize) -> Self {
        Self {
            scenario_path,
            scenario_hash,
            total_steps,
            current_step: 0,
            step_counts: vec![0; total_steps],
            active_group: None,
            captures: HashMap::new(),
            intercept_dir: None,
            last_updated: chrono::Utc::now(),
        }
    }
}

/// A contiguous span of `flat_steps` that forms one unordered group.
/// Precomputed by the validator.
#[derive(Debug, Clone)]
pub struct GroupRange {
    pub start: usize,
    pub end_exclusive: usize,
    pub name: Option<String>,
    pub mode: GroupMode,
    /// Index of this range within the scenario's top-level `steps` list,
    /// used only for diagnostics.
    pub top_index: usize,
}

impl GroupRange {
    pub fn contains(&self, flat_index: usize) -> bool {
        flat_index >= self.start && flat_index < self.end_exclusive
    }
}
