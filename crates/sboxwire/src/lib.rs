//! Framed JSON messaging between local processes.
//!
//! sboxwire moves self-describing JSON envelopes (events, commands,
//! responses, heartbeats) over any blocking byte stream, typically a Unix
//! domain socket, using a versioned length-prefixed frame.
//!
//! # Crate Structure
//!
//! - [`transport`]: Exact-length reads and whole-frame writes over `Read`/`Write`
//! - [`frame`]: The 8-byte header and raw frame codec
//! - [`schema`]: Named JSON Schema registry with passthrough for unknown names
//! - [`protocol`]: Message envelopes, builders and the framed JSON codec
//! - [`events`]: Subscription, config and health event payloads (behind `events` feature)

/// Re-export transport types.
pub mod transport {
    pub use sboxwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use sboxwire_frame::*;
}

/// Re-export schema types.
pub mod schema {
    pub use sboxwire_schema::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use sboxwire_protocol::*;
}

/// Re-export event builders (requires `events` feature).
#[cfg(feature = "events")]
pub mod events {
    pub use sboxwire_events::*;
}

pub use sboxwire_protocol::{
    bundled_registry, FramedJsonCodec, MessageEnvelope, MessageType, ProtocolError,
};
