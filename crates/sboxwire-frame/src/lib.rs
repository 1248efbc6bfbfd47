//! Versioned, length-prefixed framing.
//!
//! Every message travels as an 8-byte header followed by its payload:
//! - a 4-byte big-endian payload length
//! - a 4-byte big-endian protocol version (always 1)
//!
//! Payloads are capped at 1 MiB. This crate only deals in raw payload
//! bytes; JSON parsing and schema checks live in `sboxwire-protocol`.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, FrameHeader, HEADER_SIZE, MAX_PAYLOAD_SIZE,
    PROTOCOL_VERSION,
};
pub use error::{FrameError, Result};
pub use reader::{read_frame_from, FrameReader};
pub use writer::{write_frame_to, FrameWriter};
