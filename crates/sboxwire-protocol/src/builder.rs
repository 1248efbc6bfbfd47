use bytes::Bytes;
use serde_json::{Map, Value};

use crate::codec::FramedJsonCodec;
use crate::envelope::MessageEnvelope;
use crate::error::Result;

/// Builds envelopes and encodes them in one step.
///
/// Every method returns the complete frame, ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct MessageBuilder<'a> {
    codec: &'a FramedJsonCodec,
}

impl<'a> MessageBuilder<'a> {
    pub fn new(codec: &'a FramedJsonCodec) -> Self {
        Self { codec }
    }

    pub fn event(&self, event: Value, correlation_id: Option<String>) -> Result<Bytes> {
        self.codec
            .encode(&MessageEnvelope::event(event, correlation_id))
    }

    pub fn command(
        &self,
        command: &str,
        params: Map<String, Value>,
        correlation_id: Option<String>,
    ) -> Result<Bytes> {
        self.codec
            .encode(&MessageEnvelope::command(command, params, correlation_id))
    }

    pub fn response(
        &self,
        request_id: &str,
        status: &str,
        data: Option<Value>,
        error: Option<Value>,
    ) -> Result<Bytes> {
        self.codec
            .encode(&MessageEnvelope::response(request_id, status, data, error))
    }

    pub fn heartbeat(
        &self,
        agent_id: &str,
        status: &str,
        uptime_seconds: Option<f64>,
        version: Option<String>,
    ) -> Result<Bytes> {
        self.codec.encode(&MessageEnvelope::heartbeat(
            agent_id,
            status,
            uptime_seconds,
            version,
        ))
    }
}
