//! Response template rendering
//!
//! Templates use a simple `{{ .name }}` / `{{ .namespace.name }}`
//! substitution; conditionals are deliberately unsupported. We translate
//! the leading-dot syntax into plain Tera variable paths and render with
//! Tera's one-off renderer, which performs exactly one substitution pass
//! (no recursive re-interpretation of its own output, so rendering is a
//! fixed point for free).

use crate::error::{Result, TemplateError};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{-?\s*\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*-?\}\}")
            .expect("reference pattern is valid")
    })
}

/// Strip the leading dot from every `{{ .path }}` reference, turning it
/// into the plain `{{ path }}` syntax Tera expects.
fn strip_leading_dots(template: &str) -> String {
    reference_pattern()
        .replace_all(template, "{{ $1 }}")
        .into_owned()
}

/// Ensure every referenced path exists in `context` (inserting an empty
/// string where absent), so Tera never raises "variable not found" — a
/// missing identifier renders as the empty string
fn backfill_missing(template: &str, context: &mut Value) {
    let object = match context {
        Value::Object(map) => map,
        _ => return,
    };
    for caps in reference_pattern().captures_iter(template) {
        let path = &caps[1];
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            continue;
        };
        let remaining: Vec<&str> = segments.collect();
        if remaining.is_empty() {
            object.entry(first).or_insert(Value::String(String::new()));
            continue;
        }
        let mut cursor = object
            .entry(first)
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        for (i, segment) in remaining.iter().enumerate() {
            if !cursor.is_object() {
                *cursor = Value::Object(serde_json::Map::new());
            }
            let map = cursor.as_object_mut().expect("just normalized to object");
            let is_last = i == remaining.len() - 1;
            cursor = map.entry(*segment).or_insert_with(|| {
                if is_last {
                    Value::String(String::new())
                } else {
                    Value::Object(serde_json::Map::new())
                }
            });
        }
    }
}

/// Render `template` against `vars` (as produced by
/// [`crate::context::assemble_vars`]).
pub fn render(template: &str, vars: &Value) -> Result<String> {
    let rewritten = strip_leading_dots(template);
    let mut context_value = vars.clone();
    backfill_missing(&rewritten, &mut context_value);

    let tera_context =
        tera::Context::from_value(context_value).map_err(|e| TemplateError::Render(e.to_string()))?;
    tera::Tera::one_off(&rewritten, &tera_context, false).map_err(TemplateError::from)
}
