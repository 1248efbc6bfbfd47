//! Async counterparts of the blocking codec: a `tokio_util` codec for
//! `Framed` streams and direct helpers over tokio's I/O traits.

use std::io;

use bytes::BytesMut;
use sboxwire_frame::{FrameHeader, HEADER_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::codec::FramedJsonCodec;
use crate::envelope::MessageEnvelope;
use crate::error::{ProtocolError, Result};

/// Frames envelopes for async transports.
///
/// Header checks happen as soon as 8 bytes are buffered, so an oversized or
/// wrong-version frame is rejected without waiting for its payload.
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    inner: FramedJsonCodec,
}

impl EnvelopeCodec {
    pub fn new(inner: FramedJsonCodec) -> Self {
        Self { inner }
    }

    pub fn codec(&self) -> &FramedJsonCodec {
        &self.inner
    }
}

impl Decoder for EnvelopeCodec {
    type Item = MessageEnvelope;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let header = FrameHeader::parse(&src[..])?;
        let payload_len = header.check(self.inner.config().frame.max_payload())?;

        let total = HEADER_SIZE + payload_len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let frame = src.split_to(total);
        let (envelope, _) = self.inner.decode(&frame)?;
        Ok(Some(envelope))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match self.decode(src)? {
            Some(envelope) => Ok(Some(envelope)),
            None if src.is_empty() => Ok(None),
            None if src.len() < HEADER_SIZE => Err(ProtocolError::IncompleteMessage {
                expected: HEADER_SIZE,
                actual: src.len(),
            }),
            None => {
                let header = FrameHeader::parse(&src[..])?;
                Err(ProtocolError::IncompleteMessage {
                    expected: HEADER_SIZE + header.length as usize,
                    actual: src.len(),
                })
            }
        }
    }
}

impl Encoder<MessageEnvelope> for EnvelopeCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: MessageEnvelope, dst: &mut BytesMut) -> Result<()> {
        let bytes = self.inner.encode(&item)?;
        dst.extend_from_slice(&bytes);
        Ok(())
    }
}

impl FramedJsonCodec {
    /// Async [`read_message`](Self::read_message).
    ///
    /// Same outcomes: `Ok(None)` only when the stream closes before the
    /// first header byte.
    pub async fn read_message_async<R: AsyncRead + Unpin + ?Sized>(
        &self,
        reader: &mut R,
    ) -> Result<Option<MessageEnvelope>> {
        let mut header = [0u8; HEADER_SIZE];
        match fill(reader, &mut header).await? {
            0 => return Ok(None),
            HEADER_SIZE => {}
            n => {
                return Err(ProtocolError::IncompleteMessage {
                    expected: HEADER_SIZE,
                    actual: n,
                })
            }
        }

        let payload_len = FrameHeader::parse(&header)?.check(self.config().frame.max_payload())?;
        let mut frame = BytesMut::zeroed(HEADER_SIZE + payload_len);
        frame[..HEADER_SIZE].copy_from_slice(&header);

        let got = fill(reader, &mut frame[HEADER_SIZE..]).await?;
        if got < payload_len {
            return Err(ProtocolError::IncompleteMessage {
                expected: HEADER_SIZE + payload_len,
                actual: HEADER_SIZE + got,
            });
        }

        let (envelope, _) = self.decode(&frame)?;
        Ok(Some(envelope))
    }

    /// Async [`write_message`](Self::write_message).
    pub async fn write_message_async<W: AsyncWrite + Unpin + ?Sized>(
        &self,
        writer: &mut W,
        envelope: &MessageEnvelope,
    ) -> Result<()> {
        let bytes = self.encode(envelope)?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        debug!(id = %envelope.id, frame_len = bytes.len(), "wrote message");
        Ok(())
    }
}

/// Read until `buf` is full or the stream ends; returns the bytes read.
async fn fill<R: AsyncRead + Unpin + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::error::ErrorKind;

    fn codec() -> EnvelopeCodec {
        EnvelopeCodec::new(FramedJsonCodec::unvalidated())
    }

    #[test]
    fn waits_for_full_frame() {
        let mut codec = codec();
        let mut wire = BytesMut::new();
        codec
            .encode(MessageEnvelope::heartbeat("a", "ok", None, None), &mut wire)
            .unwrap();

        let mut partial = BytesMut::from(&wire[..5]);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.extend_from_slice(&wire[5..wire.len() - 1]);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.extend_from_slice(&wire[wire.len() - 1..]);
        let msg = codec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(msg.as_heartbeat().unwrap().agent_id, "a");
        assert!(partial.is_empty());
    }

    #[test]
    fn decodes_back_to_back_frames() {
        let mut codec = codec();
        let mut wire = BytesMut::new();
        for name in ["start", "stop"] {
            codec
                .encode(MessageEnvelope::command(name, Map::new(), None), &mut wire)
                .unwrap();
        }

        let first = codec.decode(&mut wire).unwrap().unwrap();
        let second = codec.decode(&mut wire).unwrap().unwrap();
        assert_eq!(first.as_command().unwrap().command, "start");
        assert_eq!(second.as_command().unwrap().command, "stop");
        assert!(codec.decode(&mut wire).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_header_before_payload_arrives() {
        let mut codec = codec();
        let mut wire = BytesMut::new();
        wire.extend_from_slice(&16u32.to_be_bytes());
        wire.extend_from_slice(&7u32.to_be_bytes());

        let err = codec.decode(&mut wire).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
    }

    #[test]
    fn eof_mid_frame_is_incomplete() {
        let mut codec = codec();
        let mut wire = BytesMut::new();
        codec
            .encode(MessageEnvelope::heartbeat("a", "ok", None, None), &mut wire)
            .unwrap();
        wire.truncate(wire.len() - 2);

        let err = codec.decode_eof(&mut wire).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteMessage);
        assert!(codec.decode_eof(&mut BytesMut::new()).unwrap().is_none());
    }

    #[tokio::test]
    async fn async_helpers_round_trip_over_duplex() {
        let codec = FramedJsonCodec::unvalidated();
        let (mut client, mut server) = tokio::io::duplex(4096);

        let hb = MessageEnvelope::heartbeat("agent-1", "healthy", Some(12.0), None);
        codec.write_message_async(&mut client, &hb).await.unwrap();
        drop(client);

        let received = codec.read_message_async(&mut server).await.unwrap();
        assert_eq!(received, Some(hb));
        assert!(codec.read_message_async(&mut server).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn async_read_truncated_header_is_incomplete() {
        let codec = FramedJsonCodec::unvalidated();
        let mut reader: &[u8] = &[0, 0, 1];
        let err = codec.read_message_async(&mut reader).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::IncompleteMessage { expected: 8, actual: 3 }
        ));
    }

    #[tokio::test]
    async fn async_read_truncated_payload_counts_whole_frame() {
        let codec = FramedJsonCodec::unvalidated();
        let frame = codec
            .encode(&MessageEnvelope::heartbeat("a", "ok", None, None))
            .unwrap();
        let cut = frame.len() - 4;

        let mut reader = &frame[..cut];
        let err = codec.read_message_async(&mut reader).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::IncompleteMessage { expected, actual }
                if expected == frame.len() && actual == cut
        ));

        let mut buf = BytesMut::from(&frame[..cut]);
        let err = EnvelopeCodec::new(codec).decode_eof(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::IncompleteMessage { expected, actual }
                if expected == frame.len() && actual == cut
        ));
    }

    #[tokio::test]
    async fn async_read_rejects_oversized_header() {
        let codec = FramedJsonCodec::unvalidated();
        let mut wire = Vec::new();
        wire.extend_from_slice(&(2 * 1024 * 1024u32).to_be_bytes());
        wire.extend_from_slice(&1u32.to_be_bytes());

        let mut reader = wire.as_slice();
        let err = codec.read_message_async(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MessageTooLarge);
    }
}
