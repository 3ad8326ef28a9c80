//! Verification reporters
//!
//! Three independent renderings of one [`crate::verify::VerificationResult`]:
//! human-readable text, compact JSON, and JUnit XML for CI consumption.

mod junit;
mod text;

pub use junit::render_junit;
pub use text::render_text;

use crate::verify::VerificationResult;

/// Output format selected by the CLI's `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Junit,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "junit" => Ok(ReportFormat::Junit),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

/// Render `result` in the requested `format`.
pub fn render(result: &VerificationResult, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => render_text(result),
        ReportFormat::Json => render_json(result),
        ReportFormat::Junit => render_junit(result),
    }
}

fn render_json(result: &VerificationResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| {
        format!(r#"{{"error":"failed to serialize verification result: {}"}}"#, e)
    })
}
