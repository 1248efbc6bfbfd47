use std::fmt;
use std::io;

use sboxwire_protocol::{ErrorKind, ProtocolError};
use sboxwire_schema::SchemaError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => USAGE,
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    let code = match &err {
        SchemaError::ValidationFailed { .. } | SchemaError::InvalidJson(_) => DATA_INVALID,
        SchemaError::NoSchema(_) => USAGE,
        SchemaError::LoadFailed(_) | SchemaError::CompileFailed { .. } => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    let code = match err.kind() {
        ErrorKind::InsufficientHeader
        | ErrorKind::IncompleteMessage
        | ErrorKind::UnsupportedVersion
        | ErrorKind::MessageTooLarge
        | ErrorKind::MalformedPayload
        | ErrorKind::SchemaViolation => DATA_INVALID,
        ErrorKind::Schema => FAILURE,
        ErrorKind::Serialize => INTERNAL,
        ErrorKind::Io => match &err {
            ProtocolError::Io(transport) => match transport.io_kind() {
                Some(io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
                Some(io::ErrorKind::BrokenPipe) => FAILURE,
                _ => INTERNAL,
            },
            _ => INTERNAL,
        },
    };
    CliError::new(code, format!("{context}: {err}"))
}
