//! Human-readable text reporter

use crate::verify::VerificationResult;

/// Render `result` as a human-readable report with check/cross glyphs and
/// per-step call counts.
pub fn render_text(result: &VerificationResult) -> String {
    let mut out = String::new();

    let headline = if result.passed { "PASS" } else { "FAIL" };
    out.push_str(&format!(
        "{} {} (session {})\n",
        headline, result.scenario_name, result.session_id
    ));

    if let Some(error) = &result.error {
        out.push_str(&format!("  error: {}\n", error));
        return out;
    }

    for step in &result.per_step {
        let glyph = if step.count >= step.min { "\u{2713}" } else { "\u{2717}" };
        let max_repr = step
            .max
            .map(|m| m.to_string())
            .unwrap_or_else(|| "\u{221e}".to_string());
        let group = step
            .group_name
            .as_deref()
            .map(|n| format!(" [group: {}]", n))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {} step {}: {} ({}/{}..{}){}\n",
            glyph, step.index, step.argv_summary, step.count, step.min, max_repr, group
        ));
    }

    out.push_str(&format!(
        "{} of {} step(s) consumed at least once\n",
        result.consumed_steps, result.total_steps
    ));

    out
}
