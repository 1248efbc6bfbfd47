/// Errors that can occur while moving bytes over a stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink accepted zero bytes; the peer is gone.
    #[error("transport closed while writing ({written} of {expected} bytes sent)")]
    Closed { written: usize, expected: usize },
}

impl TransportError {
    /// Kind of the underlying I/O error, if any.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io(err) => Some(err.kind()),
            Self::Closed { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
