//! Variable assembly for response templates
//!
//! Builds the variable set a step's response is rendered against, assembled
//! in precedence order: `meta.vars` (baseline) ⊕ filtered environment ⊕
//! `capture` (reserved namespace, always wins since it is applied last).

use crate::error::{Result, TemplateError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde_json::Value;
use std::collections::HashMap;

/// Env vars under this prefix are never suppressed by `deny_env_vars`,
/// even when a pattern would otherwise match them.
const EXEMPT_PREFIX: &str = "CLI_REPLAY_";

/// The assembled variable set, plus bookkeeping needed for trace output.
#[derive(Debug, Clone)]
pub struct ResolvedVars {
    /// The `serde_json::Value::Object` passed to the renderer.
    pub context: Value,
    /// Names of env vars that were suppressed by the deny list, in the
    /// order they were encountered. Used for `CLI_REPLAY_TRACE` output.
    pub denied: Vec<String>,
}

/// Compile `deny_env_vars` globs into a matchable set.
///
/// A bare `"*"` denies every non-exempt variable,
/// matched against the whole variable name (no path-separator semantics).
fn compile_deny_globs(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(TemplateError::from)?;
        builder.add(glob);
    }
    builder.build().map_err(TemplateError::from)
}

/// Assemble the variable set for one response render.
///
/// `meta_vars` is the scenario's `meta.vars` baseline. `env` is the process
/// environment (as an iterator so callers can substitute a fixture in
/// tests). `deny_globs` is `meta.security.deny_env_vars`. `captures` is the
/// session's accumulated capture map, nested under the reserved `capture`
/// key.
pub fn assemble_vars<I>(
    meta_vars: &HashMap<String, String>,
    env: I,
    deny_globs: &[String],
    captures: &HashMap<String, String>,
) -> Result<ResolvedVars>
where
    I: IntoIterator<Item = (String, String)>,
{
    let deny_set = compile_deny_globs(deny_globs)?;
    let mut resolved: HashMap<String, String> = meta_vars.clone();
    let mut denied = Vec::new();

    for (key, value) in env {
        let exempt = key.starts_with(EXEMPT_PREFIX);
        if !exempt && deny_set.is_match(&key) {
            denied.push(key);
            continue;
        }
        resolved.insert(key, value);
    }

    let mut object = serde_json::Map::new();
    for (key, value) in resolved {
        object.insert(key, Value::String(value));
    }

    let capture_object: serde_json::Map<String, Value> = captures
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    object.insert("capture".to_string(), Value::Object(capture_object));

    Ok(ResolvedVars {
        context: Value::Object(object),
        denied,
    })
}
