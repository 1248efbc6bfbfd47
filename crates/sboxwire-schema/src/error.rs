use crate::violation::Violation;

/// How many violations are spelled out in the error message.
const DISPLAYED_VIOLATIONS: usize = 4;

/// Errors that can occur while loading schemas or validating instances.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema document is not a valid 2020-12 schema.
    #[error("failed to compile schema '{name}': {message}")]
    CompileFailed { name: String, message: String },

    /// The instance failed validation.
    #[error("validation failed against '{schema}': {}", summarize(.violations))]
    ValidationFailed {
        schema: String,
        violations: Vec<Violation>,
    },

    /// A document was not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No schema registered under the name and passthrough is disabled.
    #[error("no schema registered for '{0}'")]
    NoSchema(String),
}

fn summarize(violations: &[Violation]) -> String {
    let mut out = violations
        .iter()
        .take(DISPLAYED_VIOLATIONS)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    if violations.len() > DISPLAYED_VIOLATIONS {
        out.push_str(&format!(
            "; ... {} more",
            violations.len() - DISPLAYED_VIOLATIONS
        ));
    }
    out
}

pub type Result<T> = std::result::Result<T, SchemaError>;
