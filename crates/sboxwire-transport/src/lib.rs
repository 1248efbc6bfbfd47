//! Blocking byte stream adapters.
//!
//! The framing layer never talks to a raw `Read`/`Write`. It goes through
//! two narrow contracts instead:
//! - [`ByteSource`]: read exactly N bytes, or report a clean close / short read
//! - [`ByteSink`]: write every byte of a frame and flush, or fail
//!
//! Blanket implementations cover every `std::io::Read` and `std::io::Write`,
//! so sockets, pipes, files and in-memory cursors all work unchanged.

pub mod error;
pub mod traits;

pub use error::{Result, TransportError};
pub use traits::{ByteSink, ByteSource, ReadExact};
