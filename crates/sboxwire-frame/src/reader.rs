use bytes::BytesMut;
use sboxwire_transport::{ByteSource, ReadExact};
use tracing::debug;

use crate::codec::{Frame, FrameConfig, FrameHeader, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Reads complete frames from any [`ByteSource`].
///
/// Each call performs two exact-length reads: the 8-byte header, then the
/// declared payload. A stream that closes before the first header byte is a
/// clean end of stream (`Ok(None)`); closing anywhere later is an error.
/// `IncompleteMessage` counts whole-frame bytes, header included, the same
/// way [`decode_frame`](crate::codec::decode_frame) does.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: ByteSource> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Ok(None)` when the stream was closed before any header byte.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        read_frame_from(&mut self.inner, &self.config)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Read one frame from a borrowed source without wrapping it.
pub fn read_frame_from<S: ByteSource + ?Sized>(
    source: &mut S,
    config: &FrameConfig,
) -> Result<Option<Frame>> {
    let mut header_buf = [0u8; HEADER_SIZE];
    match source.read_exact_or_eof(&mut header_buf)? {
        ReadExact::Complete => {}
        ReadExact::Eof => {
            debug!("stream closed before frame header");
            return Ok(None);
        }
        ReadExact::Short(n) => {
            return Err(FrameError::IncompleteMessage {
                expected: HEADER_SIZE,
                actual: n,
            })
        }
    }

    let header = FrameHeader::parse(&header_buf)?;
    let payload_len = header.check(config.max_payload())?;

    let mut payload = BytesMut::zeroed(payload_len);
    let outcome = source.read_exact_or_eof(&mut payload)?;
    if outcome != ReadExact::Complete {
        return Err(FrameError::IncompleteMessage {
            expected: HEADER_SIZE + payload_len,
            actual: HEADER_SIZE + outcome.filled(payload_len),
        });
    }

    debug!(payload_len, "read frame");
    Ok(Some(Frame {
        payload: payload.freeze(),
    }))
}
