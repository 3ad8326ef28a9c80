//! Replay engine — the match/advance state
//! machine, capture propagation, and response rendering.
//!
//! This is the heart of the system: given a scenario's precomputed flat
//! step list, the session's current [`State`], and one received
//! `(argv, stdin)` pair, [`advance`] decides which step (if any) matched,
//! mutates the call counts, captures, and cursor, and renders the matched
//! step's response via `cli-replay-template`.

use crate::error::{ReplayError, Result};
use crate::matcher::{argv_match, first_difference};
use crate::model::{CallsConfig, EffectiveBounds, State};
use crate::validate::ValidatedScenario;
use std::collections::HashMap;

/// Bytes and exit code produced by a single matched invocation, plus the
/// index of the step that matched (for `CLI_REPLAY_TRACE` output).
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
    pub matched_step: usize,
}

/// Everything the engine needs to render a response beyond the scenario
/// and state themselves: the scenario's own directory (for file-backed
/// responses) and the process environment to fold into the template
/// context.
pub struct RenderInputs<'a> {
    pub scenario_dir: &'a std::path::Path,
    pub env: Vec<(String, String)>,
}

fn effective_bounds(calls: Option<&CallsConfig>) -> EffectiveBounds {
    CallsConfig::effective_bounds(calls)
}

/// Largest index `<= index` that lands on a UTF-8 character boundary in
/// `s`, so a byte-offset cap never splits a multi-byte character.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut idx = index;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Normalize stdin: CRLF -> LF, strip trailing
/// newlines, cap at 1 MiB.
pub fn normalize_stdin(raw: &str) -> String {
    const CAP: usize = 1024 * 1024;
    let capped = if raw.len() > CAP {
        &raw[..floor_char_boundary(raw, CAP)]
    } else {
        raw
    };
    let unified = capped.replace("\r\n", "\n");
    unified.trim_end_matches('\n').to_string()
}

/// Run one match/advance cycle and render the matched step's response.
///
/// `received_stdin` is `None` when the invoking command supplied none;
/// `Some` when stdin was captured (possibly empty).
pub fn advance(
    validated: &ValidatedScenario,
    state: &mut State,
    received_argv: &[String],
    received_stdin: Option<&str>,
    inputs: &RenderInputs<'_>,
) -> Result<ReplayOutcome> {
    let total_steps = validated.total_steps();
    let mut i = state.current_step;

    // Phase A: skip steps whose max has already been reached.
    loop {
        while i < total_steps
            && state.step_counts[i] >= effective_bounds(validated.flat_steps[i].calls.as_ref()).effective_max()
        {
            i += 1;
        }
        if i >= total_steps {
            return Err(ReplayError::ScenarioComplete { total_steps });
        }

        if let Some(group) = validated.group_containing(i) {
            // Phase B: group mode — scan the whole range for a match.
            let mut matched = None;
            for j in group.start..group.end_exclusive {
                let bounds = effective_bounds(validated.flat_steps[j].calls.as_ref());
                if state.step_counts[j] < bounds.effective_max()
                    && argv_match(&validated.flat_steps[j].match_.argv, received_argv)
                {
                    matched = Some(j);
                    break;
                }
            }

            let Some(matched_index) = matched else {
                let unmet = (group.start..group.end_exclusive).any(|j| {
                    let bounds = effective_bounds(validated.flat_steps[j].calls.as_ref());
                    state.step_counts[j] < bounds.min
                });
                if unmet {
                    return Err(ReplayError::GroupMismatch {
                        group: group
                            .name
                            .clone()
                            .unwrap_or_else(|| format!("#{}", group.top_index)),
                        candidates: (group.start..group.end_exclusive).collect(),
                    });
                }
                // Group fully satisfied: advance past it and retry.
                state.current_step = group.end_exclusive;
                i = group.end_exclusive;
                continue;
            };

            return commit(validated, state, matched_index, received_stdin, inputs);
        }

        // Phase C: ordered mode.
        let expected = &validated.flat_steps[i];
        if argv_match(&expected.match_.argv, received_argv) {
            return commit(validated, state, i, received_stdin, inputs);
        }

        let bounds = effective_bounds(expected.calls.as_ref());
        if state.step_counts[i] >= bounds.min && i + 1 < total_steps {
            let next = i + 1;
            if argv_match(&validated.flat_steps[next].match_.argv, received_argv) {
                state.current_step = next;
                return commit(validated, state, next, received_stdin, inputs);
            }
            let position = first_difference(&validated.flat_steps[next].match_.argv, received_argv)
                .unwrap_or(0);
            return Err(ReplayError::ArgvMismatch {
                step: i,
                position,
                expected: format_argv(&validated.flat_steps[next].match_.argv),
                received: received_argv.join(" "),
                soft_advanced: true,
            });
        }

        let position = first_difference(&expected.match_.argv, received_argv).unwrap_or(0);
        return Err(ReplayError::ArgvMismatch {
            step: i,
            position,
            expected: format_argv(&expected.match_.argv),
            received: received_argv.join(" "),
            soft_advanced: false,
        });
    }
}

fn format_argv(argv: &[crate::model::PatternElement]) -> String {
    argv.iter()
        .map(|p| match p {
            crate::model::PatternElement::Literal(s) => s.clone(),
            crate::model::PatternElement::Wildcard => "*".to_string(),
            crate::model::PatternElement::Regex(r) => format!("/{}/", r),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Phases D-F: stdin check, commit the call count / captures / cursor
/// mutation, then render the response.
fn commit(
    validated: &ValidatedScenario,
    state: &mut State,
    matched: usize,
    received_stdin: Option<&str>,
    inputs: &RenderInputs<'_>,
) -> Result<ReplayOutcome> {
    let step = &validated.flat_steps[matched];

    if let Some(expected_stdin) = &step.match_.stdin {
        let received = received_stdin.unwrap_or("");
        if normalize_stdin(received) != normalize_stdin(expected_stdin) {
            let preview: String = received.chars().take(200).collect();
            return Err(ReplayError::StdinMismatch {
                step: matched,
                preview,
            });
        }
    }

    // Phase E: commit.
    state.step_counts[matched] += 1;
    for (k, v) in &step.respond.capture {
        state.captures.insert(k.clone(), v.clone());
    }
    let bounds = effective_bounds(step.calls.as_ref());
    let group_here = validated.group_containing(matched);
    if state.step_counts[matched] >= bounds.effective_max() && group_here.is_none() {
        state.current_step = matched + 1;
    }
    state.active_group = group_here.map(|g| g.top_index);
    state.last_updated = chrono::Utc::now();

    // Phase F: render response.
    render_response(validated, step, state, inputs, matched)
}

fn render_response(
    validated: &ValidatedScenario,
    step: &crate::model::Step,
    state: &State,
    inputs: &RenderInputs<'_>,
    matched: usize,
) -> Result<ReplayOutcome> {
    let deny_globs: Vec<String> = validated
        .scenario
        .meta
        .security
        .as_ref()
        .map(|s| s.deny_env_vars.clone())
        .unwrap_or_default();

    let resolved = cli_replay_template::assemble_vars(
        &validated.scenario.meta.vars,
        inputs.env.iter().cloned(),
        &deny_globs,
        &state.captures,
    )?;

    let stdout = render_output(
        step.respond.stdout.as_deref(),
        step.respond.stdout_file.as_deref(),
        inputs.scenario_dir,
        &resolved.context,
    )?;
    let stderr = render_output(
        step.respond.stderr.as_deref(),
        step.respond.stderr_file.as_deref(),
        inputs.scenario_dir,
        &resolved.context,
    )?;

    Ok(ReplayOutcome {
        stdout,
        stderr,
        exit_code: step.respond.exit as i32,
        matched_step: matched,
    })
}

fn render_output(
    inline: Option<&str>,
    file: Option<&std::path::Path>,
    scenario_dir: &std::path::Path,
    vars: &serde_json::Value,
) -> Result<Vec<u8>> {
    let template = if let Some(path) = file {
        let full = scenario_dir.join(path);
        Some(std::fs::read_to_string(&full).map_err(|source| ReplayError::FileBackedResponse {
            path: full.display().to_string(),
            source,
        })?)
    } else {
        inline.map(|s| s.to_string())
    };

    match template {
        Some(text) => Ok(cli_replay_template::render(&text, vars)?.into_bytes()),
        None => Ok(Vec::new()),
    }
}

/// Denied env var names produced by the last render, for
/// `CLI_REPLAY_TRACE` output. Exposed separately because
/// [`advance`]'s error path never reaches rendering.
pub fn denied_env_vars(
    validated: &ValidatedScenario,
    captures: &HashMap<String, String>,
    env: Vec<(String, String)>,
) -> Result<Vec<String>> {
    let deny_globs: Vec<String> = validated
        .scenario
        .meta
        .security
        .as_ref()
        .map(|s| s.deny_env_vars.clone())
        .unwrap_or_default();
    let resolved = cli_replay_template::assemble_vars(
        &validated.scenario.meta.vars,
        env,
        &deny_globs,
        captures,
    )?;
    Ok(resolved.denied)
}
