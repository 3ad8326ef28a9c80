//! Template error types for cli-replay-template
//!
//! Structured error handling for variable assembly and response rendering.

use std::fmt;

/// Template rendering errors
#[derive(Debug, Clone)]
pub enum TemplateError {
    /// Template rendering failed (malformed template, Tera engine error)
    Render(String),
    /// A `deny_env_vars` glob pattern failed to compile
    InvalidGlob(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Render(msg) => write!(f, "template rendering error: {}", msg),
            TemplateError::InvalidGlob(msg) => write!(f, "invalid deny_env_vars glob: {}", msg),
        }
    }
}

impl std::error::Error for TemplateError {}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::Render(err.to_string())
    }
}

impl From<globset::Error> for TemplateError {
    fn from(err: globset::Error) -> Self {
        TemplateError::InvalidGlob(err.to_string())
    }
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
