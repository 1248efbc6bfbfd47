use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::error::{Result, TransportError};

/// Outcome of an exact-length read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadExact {
    /// The buffer was filled completely.
    Complete,
    /// The stream was closed before a single byte arrived.
    Eof,
    /// The stream was closed after `n` bytes, short of the buffer length.
    Short(usize),
}

impl ReadExact {
    /// Number of bytes placed in the buffer for a request of `len` bytes.
    pub fn filled(self, len: usize) -> usize {
        match self {
            Self::Complete => len,
            Self::Eof => 0,
            Self::Short(n) => n,
        }
    }
}

/// A blocking byte source that can fill a buffer exactly.
///
/// Implementations must distinguish "closed before any data" from
/// "closed part-way through"; the framing layer treats the first as a
/// clean end of stream and the second as a truncated frame.
pub trait ByteSource {
    /// Fill `buf` completely, or report how far the stream got before closing.
    fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> Result<ReadExact>;
}

/// A blocking byte sink that writes whole frames.
pub trait ByteSink {
    /// Write every byte of `bytes`, then flush.
    ///
    /// Nothing is retried except `Interrupted`; any other failure is
    /// surfaced and the frame must be considered lost.
    fn write_all_flush(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<T: Read + ?Sized> ByteSource for T {
    fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> Result<ReadExact> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        trace!(requested = buf.len(), filled, "exact read finished");
        Ok(match filled {
            n if n == buf.len() => ReadExact::Complete,
            0 => ReadExact::Eof,
            n => ReadExact::Short(n),
        })
    }
}

impl<T: Write + ?Sized> ByteSink for T {
    fn write_all_flush(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.write(&bytes[offset..]) {
                Ok(0) => {
                    return Err(TransportError::Closed {
                        written: offset,
                        expected: bytes.len(),
                    })
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match self.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}
