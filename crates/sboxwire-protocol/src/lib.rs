//! Framed JSON message envelopes for local IPC.
//!
//! An envelope carries common fields (`id`, `type`, `timestamp`, optional
//! `correlation_id` and `metadata`) plus exactly one kind-specific payload:
//! `event`, `command`, `response` or `heartbeat`.
//!
//! [`FramedJsonCodec`] turns envelopes into length-prefixed frames and back,
//! optionally checking them against a named schema on the way through.
//!
//! ```no_run
//! use std::os::unix::net::UnixStream;
//!
//! use sboxwire_protocol::{bundled_registry, FramedJsonCodec, MessageEnvelope};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = FramedJsonCodec::new(bundled_registry()?);
//! let mut stream = UnixStream::connect("/run/sboxagent.sock")?;
//!
//! let hb = MessageEnvelope::heartbeat("agent-123", "healthy", Some(3600.5), Some("1.0.0".into()));
//! codec.write_message(&mut stream, &hb)?;
//!
//! while let Some(msg) = codec.read_message(&mut stream)? {
//!     println!("{} {}", msg.message_type(), msg.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod bundled;
pub mod codec;
pub mod envelope;
pub mod error;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::EnvelopeCodec;
pub use builder::MessageBuilder;
pub use bundled::{bundled_registry, PROTOCOL_V1, PROTOCOL_V1_SCHEMA};
pub use codec::{CodecConfig, FramedJsonCodec};
pub use envelope::{
    CommandPayload, HeartbeatPayload, MessageBody, MessageEnvelope, MessageType, ResponsePayload,
};
pub use error::{ErrorKind, ProtocolError, Result};
