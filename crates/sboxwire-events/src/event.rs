use sboxwire_protocol::envelope::now_timestamp;
use sboxwire_protocol::MessageEnvelope;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Default source for events raised by the manager.
pub const SOURCE_MANAGER: &str = "sboxmgr";

/// Default source for events raised by the agent.
pub const SOURCE_AGENT: &str = "sboxagent";

/// A domain event, the payload of an `event` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub timestamp: String,
    pub source: String,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Event {
    /// A data-less event with a fresh id and the current time.
    pub fn new(event_type: impl Into<String>, ctx: &EventContext, default_source: &str) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: now_timestamp(),
            source: ctx.source_or(default_source),
            event_type: event_type.into(),
            data: Value::Null,
            correlation_id: ctx.correlation_id.clone().filter(|id| !id.is_empty()),
            metadata: ctx.metadata.clone().filter(|map| !map.is_empty()),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// The event as a JSON object.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Wrap the event in an `event` envelope.
    pub fn into_message(self, correlation_id: Option<String>) -> Result<MessageEnvelope> {
        Ok(MessageEnvelope::event(self.to_value()?, correlation_id))
    }
}

/// Per-call options shared by every builder.
///
/// An unset `source` falls back to the builder's default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventContext {
    pub source: Option<String>,
    pub correlation_id: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn source_or(&self, default: &str) -> String {
        match &self.source {
            Some(source) if !source.is_empty() => source.clone(),
            _ => default.to_string(),
        }
    }
}
