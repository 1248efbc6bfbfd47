use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use sboxwire_frame::{
    decode_frame, encode_frame, read_frame_from, write_frame_to, FrameConfig, HEADER_SIZE,
};
use sboxwire_schema::SchemaRegistry;
use sboxwire_transport::{ByteSink, ByteSource};
use serde_json::Value;
use tracing::debug;

use crate::bundled::PROTOCOL_V1;
use crate::envelope::MessageEnvelope;
use crate::error::{ProtocolError, Result};

/// Codec behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Frame size limits.
    pub frame: FrameConfig,
    /// Run schema validation on encode and decode.
    pub validate: bool,
    /// Registry name of the schema envelopes are checked against.
    pub schema_name: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            validate: true,
            schema_name: PROTOCOL_V1.to_string(),
        }
    }
}

/// Encodes envelopes to frames and decodes frames back to envelopes.
///
/// The codec holds no per-connection state; one instance can serve any
/// number of connections, each driven by its own thread. Validation against
/// a name with no registered schema is a passthrough.
#[derive(Debug, Clone)]
pub struct FramedJsonCodec {
    registry: Arc<SchemaRegistry>,
    config: CodecConfig,
}

impl FramedJsonCodec {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: Arc<SchemaRegistry>, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    /// A codec that never validates.
    pub fn unvalidated() -> Self {
        Self::with_config(
            Arc::new(SchemaRegistry::new()),
            CodecConfig {
                validate: false,
                ..CodecConfig::default()
            },
        )
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Check a JSON value against the configured schema.
    ///
    /// Succeeds without looking when validation is disabled.
    pub fn validate_value(&self, value: &Value) -> Result<()> {
        if !self.config.validate {
            return Ok(());
        }
        self.registry
            .validate(&self.config.schema_name, value)
            .map_err(ProtocolError::from)
    }

    /// Serialize, validate and frame an envelope.
    ///
    /// Nothing is produced when validation fails.
    pub fn encode(&self, envelope: &MessageEnvelope) -> Result<Bytes> {
        let value = serde_json::to_value(envelope).map_err(ProtocolError::Serialize)?;
        self.encode_value(&value)
    }

    /// Validate and frame an arbitrary JSON value.
    pub fn encode_value(&self, value: &Value) -> Result<Bytes> {
        let payload = self.payload_for(value)?;
        self.config.frame.check_payload_len(payload.len())?;

        let mut dst = BytesMut::new();
        encode_frame(&payload, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Decode the first frame in `src`.
    ///
    /// Returns the envelope and the bytes consumed (`8 + N`). Anything after
    /// the frame is left for the next call.
    pub fn decode(&self, src: &[u8]) -> Result<(MessageEnvelope, usize)> {
        let (value, consumed) = self.decode_value(src)?;
        Ok((into_envelope(value)?, consumed))
    }

    /// Like [`decode`](Self::decode) but stops at the validated JSON value.
    pub fn decode_value(&self, src: &[u8]) -> Result<(Value, usize)> {
        let (frame, consumed) = decode_frame(src, self.config.frame.max_payload())?;
        let value = self.parse_payload(&frame.payload)?;
        Ok((value, consumed))
    }

    /// Read one message from a blocking source.
    ///
    /// `Ok(None)` means the peer closed the stream cleanly between messages.
    pub fn read_message<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<Option<MessageEnvelope>> {
        let Some(frame) = read_frame_from(source, &self.config.frame)? else {
            return Ok(None);
        };
        let value = self.parse_payload(&frame.payload)?;
        into_envelope(value).map(Some)
    }

    /// Encode and write one message with a single write and flush.
    pub fn write_message<S: ByteSink + ?Sized>(
        &self,
        sink: &mut S,
        envelope: &MessageEnvelope,
    ) -> Result<()> {
        let value = serde_json::to_value(envelope).map_err(ProtocolError::Serialize)?;
        let payload = self.payload_for(&value)?;
        let mut scratch = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        write_frame_to(sink, &payload, &self.config.frame, &mut scratch)?;
        debug!(
            id = %envelope.id,
            kind = %envelope.message_type(),
            frame_len = scratch.len(),
            "wrote message"
        );
        Ok(())
    }

    /// Validate `value` and serialize it as compact JSON.
    fn payload_for(&self, value: &Value) -> Result<Vec<u8>> {
        self.validate_value(value)?;
        serde_json::to_vec(value).map_err(ProtocolError::Serialize)
    }

    fn parse_payload(&self, payload: &[u8]) -> Result<Value> {
        let text = std::str::from_utf8(payload)
            .map_err(|err| ProtocolError::MalformedPayload(format!("invalid UTF-8: {err}")))?;
        let value: Value = serde_json::from_str(text)
            .map_err(|err| ProtocolError::MalformedPayload(format!("invalid JSON: {err}")))?;
        self.validate_value(&value)?;
        Ok(value)
    }
}

fn into_envelope(value: Value) -> Result<MessageEnvelope> {
    serde_json::from_value(value)
        .map_err(|err| ProtocolError::MalformedPayload(format!("not a message envelope: {err}")))
}
