use sboxwire_frame::FrameError;
use sboxwire_schema::{SchemaError, Violation};
use sboxwire_transport::TransportError;

/// Errors raised while encoding, decoding, reading or writing messages.
///
/// None of these are retried internally. A clean end of stream is not an
/// error: `read_message` returns `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Fewer than 8 bytes were available for the header.
    #[error("insufficient data for frame header ({len} bytes)")]
    InsufficientHeader { len: usize },

    /// The header or payload ended before its declared length.
    #[error("incomplete message: need {expected} bytes, have {actual}")]
    IncompleteMessage { expected: usize, actual: usize },

    /// The header carries a protocol version other than 1.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u32),

    /// The declared or encoded payload exceeds the size ceiling.
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The payload is not UTF-8, not JSON, or not an envelope.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The message failed its registered schema.
    #[error("schema violation against '{schema}' ({} violation(s)): {}", .violations.len(), first_violation(.violations))]
    SchemaViolation {
        schema: String,
        violations: Vec<Violation>,
    },

    /// The schema registry refused the lookup (passthrough disabled).
    #[error("schema error: {0}")]
    Schema(SchemaError),

    /// The envelope could not be serialized.
    #[error("failed to serialize message: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The underlying stream failed.
    #[error("message I/O error: {0}")]
    Io(#[from] TransportError),
}

/// Discriminant-only view of [`ProtocolError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InsufficientHeader,
    IncompleteMessage,
    UnsupportedVersion,
    MessageTooLarge,
    MalformedPayload,
    SchemaViolation,
    Schema,
    Serialize,
    Io,
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientHeader { .. } => ErrorKind::InsufficientHeader,
            Self::IncompleteMessage { .. } => ErrorKind::IncompleteMessage,
            Self::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            Self::MessageTooLarge { .. } => ErrorKind::MessageTooLarge,
            Self::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Self::Schema(_) => ErrorKind::Schema,
            Self::Serialize(_) => ErrorKind::Serialize,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// The violations carried by a `SchemaViolation`, or an empty slice.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaViolation { violations, .. } => violations.as_slice(),
            _ => &[],
        }
    }
}

impl From<FrameError> for ProtocolError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::InsufficientHeader { len } => Self::InsufficientHeader { len },
            FrameError::IncompleteMessage { expected, actual } => {
                Self::IncompleteMessage { expected, actual }
            }
            FrameError::UnsupportedVersion(version) => Self::UnsupportedVersion(version),
            FrameError::MessageTooLarge { size, max } => Self::MessageTooLarge { size, max },
            FrameError::Transport(err) => Self::Io(err),
        }
    }
}

impl From<SchemaError> for ProtocolError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::ValidationFailed { schema, violations } => {
                Self::SchemaViolation { schema, violations }
            }
            other => Self::Schema(other),
        }
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(TransportError::Io(err))
    }
}

fn first_violation(violations: &[Violation]) -> String {
    violations
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
