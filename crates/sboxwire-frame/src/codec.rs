use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::error::{FrameError, Result};

/// Frame header: length (4) + version (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// The single protocol version this codec speaks.
pub const PROTOCOL_VERSION: u32 = 1;

/// Hard payload ceiling: 1 MiB.
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// A decoded frame payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The raw payload bytes (UTF-8 JSON on the wire, unchecked here).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// The fixed 8-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Declared payload length in bytes.
    pub length: u32,
    /// Declared protocol version.
    pub version: u32,
}

impl FrameHeader {
    /// Header for a payload of `length` bytes at the current version.
    pub fn new(length: u32) -> Self {
        Self {
            length,
            version: PROTOCOL_VERSION,
        }
    }

    /// Parse the header from the first 8 bytes of `src`.
    pub fn parse(src: &[u8]) -> Result<Self> {
        let Some(header) = src.get(..HEADER_SIZE) else {
            return Err(FrameError::InsufficientHeader { len: src.len() });
        };
        let (length, version) = header.split_at(4);
        Ok(Self {
            length: u32::from_be_bytes([length[0], length[1], length[2], length[3]]),
            version: u32::from_be_bytes([version[0], version[1], version[2], version[3]]),
        })
    }

    /// Check version then size; returns the payload length on success.
    ///
    /// The version is checked first, so a frame from a future protocol is
    /// reported as such even when its length would also be rejected.
    pub fn check(&self, max_payload: usize) -> Result<usize> {
        if self.version != PROTOCOL_VERSION {
            return Err(FrameError::UnsupportedVersion(self.version));
        }

        let length = self.length as usize;
        let max = max_payload.min(MAX_PAYLOAD_SIZE);
        if length > max {
            return Err(FrameError::MessageTooLarge { size: length, max });
        }

        Ok(length)
    }

    /// Serialize the header as it appears on the wire.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&self.length.to_be_bytes());
        out[4..].copy_from_slice(&self.version.to_be_bytes());
        out
    }
}

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬─────────────────────┐
/// │ Length (4B)  │ Version (4B) │ Payload             │
/// │ u32 BE       │ u32 BE = 1   │ (Length bytes JSON) │
/// └──────────────┴──────────────┴─────────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::MessageTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }

    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u32(payload.len() as u32);
    dst.put_u32(PROTOCOL_VERSION);
    dst.put_slice(payload);
    debug!(payload_len = payload.len(), "encoded frame");
    Ok(())
}

/// Decode one frame from the front of `src`.
///
/// Returns the frame and the number of bytes it occupied. Bytes after the
/// frame are left for the caller; `src` may hold several frames back to back.
pub fn decode_frame(src: &[u8], max_payload: usize) -> Result<(Frame, usize)> {
    let header = FrameHeader::parse(src)?;
    let payload_len = header.check(max_payload)?;

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Err(FrameError::IncompleteMessage {
            expected: total,
            actual: src.len(),
        });
    }

    let payload = Bytes::copy_from_slice(&src[HEADER_SIZE..total]);
    debug!(payload_len, "decoded frame");
    Ok((Frame { payload }, total))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Values above 1 MiB are clamped.
    pub max_payload_size: usize,
}

impl FrameConfig {
    /// The effective ceiling after clamping to [`MAX_PAYLOAD_SIZE`].
    pub fn max_payload(&self) -> usize {
        self.max_payload_size.min(MAX_PAYLOAD_SIZE)
    }

    /// Reject a payload of `len` bytes if it exceeds [`max_payload`](Self::max_payload).
    pub fn check_payload_len(&self, len: usize) -> Result<()> {
        let max = self.max_payload();
        if len > max {
            return Err(FrameError::MessageTooLarge { size: len, max });
        }
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}
