//! JUnit XML reporter
//!
//! Built by hand rather than via a crate: a single
//! `<testsuites><testsuite>` wrapping one `<testcase>` per flat step, with
//! a `<failure>` child when that step's minimum call count went unmet.

use crate::verify::VerificationResult;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_junit(result: &VerificationResult) -> String {
    let failures = result.per_step.iter().filter(|s| s.count < s.min).count();
    let timestamp = chrono::Utc::now().to_rfc3339();

    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str(&format!(
        r#"<testsuites tests="{}" failures="{}">"#,
        result.total_steps, failures
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"<testsuite name="cli-replay" tests="{}" failures="{}" timestamp="{}">"#,
        result.total_steps, failures, timestamp
    ));
    out.push('\n');

    if let Some(error) = &result.error {
        out.push_str(&format!(
            "  <testcase classname=\"{}\" name=\"setup\">\n",
            escape_xml(&result.scenario_name)
        ));
        out.push_str(&format!(
            "    <failure message=\"{}\" />\n",
            escape_xml(error)
        ));
        out.push_str("  </testcase>\n");
    }

    for step in &result.per_step {
        out.push_str(&format!(
            "  <testcase classname=\"{}\" name=\"{}\">\n",
            escape_xml(&result.scenario_name),
            escape_xml(&step.argv_summary)
        ));
        if step.count < step.min {
            out.push_str(&format!(
                "    <failure message=\"step {} called {} time(s), wanted at least {}\" />\n",
                step.index, step.count, step.min
            ));
        }
        out.push_str("  </testcase>\n");
    }

    out.push_str("</testsuite>\n");
    out.push_str("</testsuites>\n");
    out
}
