use sboxwire_transport::TransportError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer than 8 bytes were available for the header.
    #[error("insufficient data for frame header ({len} bytes, need 8)")]
    InsufficientHeader { len: usize },

    /// The header or payload ended before its declared length.
    #[error("incomplete message: need {expected} bytes, have {actual}")]
    IncompleteMessage { expected: usize, actual: usize },

    /// The header carries a protocol version other than the supported one.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u32),

    /// The declared payload length exceeds the configured ceiling.
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The underlying stream failed.
    #[error("frame I/O error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
