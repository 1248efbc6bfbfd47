use sboxwire_schema::{SchemaError, Violation};

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The named event schema was never loaded.
    #[error("event schema '{0}' not found")]
    SchemaNotFound(String),

    #[error("event validation failed against '{schema}': {}", summarize(.violations))]
    Invalid {
        schema: String,
        violations: Vec<Violation>,
    },

    #[error("schema error: {0}")]
    Schema(SchemaError),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<SchemaError> for EventError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::ValidationFailed { schema, violations } => {
                Self::Invalid { schema, violations }
            }
            SchemaError::NoSchema(name) => Self::SchemaNotFound(name),
            other => Self::Schema(other),
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, EventError>;
