use bytes::BytesMut;
use sboxwire_transport::ByteSink;
use tracing::debug;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any [`ByteSink`].
///
/// Header and payload are assembled in one buffer and handed to the sink
/// in a single write-and-flush, so a reader on the same stream never
/// observes half a frame from this writer.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: ByteSink> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Frame `payload` and write it (blocking).
    pub fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        write_frame_to(&mut self.inner, payload, &self.config, &mut self.buf)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Frame `payload` into `scratch` and write it to a borrowed sink.
///
/// `scratch` is cleared first, so one buffer can be reused across calls.
pub fn write_frame_to<S: ByteSink + ?Sized>(
    sink: &mut S,
    payload: &[u8],
    config: &FrameConfig,
    scratch: &mut BytesMut,
) -> Result<()> {
    config.check_payload_len(payload.len())?;

    scratch.clear();
    encode_frame(payload, scratch)?;
    sink.write_all_flush(&scratch[..])?;
    debug!(frame_len = scratch.len(), "wrote frame");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind, Write};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use sboxwire_transport::TransportError;

    use super::*;
    use crate::codec::{decode_frame, HEADER_SIZE, MAX_PAYLOAD_SIZE};
    use crate::error::FrameError;

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.write_frame(b"hello").unwrap();

        let wire = writer.into_inner().into_inner();
        let (frame, consumed) = decode_frame(&wire, MAX_PAYLOAD_SIZE).unwrap();
        assert_eq!(frame.payload.as_ref(), b"hello");
        assert_eq!(consumed, wire.len());
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.write_frame(b"one").unwrap();
        writer.write_frame(b"two").unwrap();

        let wire = writer.into_inner().into_inner();
        let (f1, used) = decode_frame(&wire, MAX_PAYLOAD_SIZE).unwrap();
        let (f2, _) = decode_frame(&wire[used..], MAX_PAYLOAD_SIZE).unwrap();
        assert_eq!(f1.payload.as_ref(), b"one");
        assert_eq!(f2.payload.as_ref(), b"two");
    }

    #[test]
    fn reused_scratch_buffer_holds_only_the_current_frame() {
        let mut sink = Vec::<u8>::new();
        let mut scratch = BytesMut::new();
        let cfg = FrameConfig::default();

        write_frame_to(&mut sink, b"one", &cfg, &mut scratch).unwrap();
        write_frame_to(&mut sink, b"two", &cfg, &mut scratch).unwrap();

        assert_eq!(sink.len(), 2 * (HEADER_SIZE + 3));
        let (f1, used) = decode_frame(&sink, MAX_PAYLOAD_SIZE).unwrap();
        let (f2, rest) = decode_frame(&sink[used..], MAX_PAYLOAD_SIZE).unwrap();
        assert_eq!(f1.payload.as_ref(), b"one");
        assert_eq!(f2.payload.as_ref(), b"two");
        assert_eq!(used + rest, sink.len());
    }

    #[test]
    fn payload_too_large_rejected_without_writing() {
        let cfg = FrameConfig {
            max_payload_size: 4,
        };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), cfg);

        let err = writer.write_frame(b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { size: 9, max: 4 }));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    #[test]
    fn frame_is_written_in_one_call_and_flushed() {
        let sink = RecordingWriter::default();
        let writes = Arc::clone(&sink.writes);
        let flushed = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.write_frame(b"atomic").unwrap();

        assert_eq!(writes.load(Ordering::SeqCst), 1);
        assert!(flushed.load(Ordering::SeqCst));
        assert_eq!(writer.get_ref().data.len(), HEADER_SIZE + 6);
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.write_frame(b"x").unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Closed { .. })
        ));
    }

    #[test]
    fn write_error_surfaces_without_retry() {
        let mut writer = FrameWriter::new(BrokenPipeWriter);
        let err = writer.write_frame(b"x").unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(ref e) if e.io_kind() == Some(ErrorKind::BrokenPipe)
        ));
    }

    #[test]
    fn written_bytes_read_back() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_frame(b"z").unwrap();

        let wire = writer.into_inner().into_inner();
        let mut reader = crate::reader::FrameReader::new(Cursor::new(wire));
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"z");
    }

    #[derive(Default)]
    struct RecordingWriter {
        writes: Arc<AtomicUsize>,
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipeWriter;

    impl Write for BrokenPipeWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
