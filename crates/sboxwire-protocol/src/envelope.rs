use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The four message kinds carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Event,
    Command,
    Response,
    Heartbeat,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Command => "command",
            Self::Response => "response",
            Self::Heartbeat => "heartbeat",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `command` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub command: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Payload of a `response` message.
///
/// `data` and `error` are independent optionals. Only one is expected to
/// carry meaning; the bundled `protocol_v1` schema rejects both together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub status: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Payload of a `heartbeat` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatPayload {
    pub agent_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Kind-specific part of an envelope.
///
/// On the wire this is the `type` field plus one field named after it,
/// e.g. `"type":"heartbeat","heartbeat":{...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Event { event: Value },
    Command { command: CommandPayload },
    Response { response: ResponsePayload },
    Heartbeat { heartbeat: HeartbeatPayload },
}

impl MessageBody {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Event { .. } => MessageType::Event,
            Self::Command { .. } => MessageType::Command,
            Self::Response { .. } => MessageType::Response,
            Self::Heartbeat { .. } => MessageType::Heartbeat,
        }
    }
}

/// A decoded logical message.
///
/// Optional fields are omitted from the JSON when `None`, never written
/// as `null`, so schemas can tell "absent" from "present".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub id: String,
    #[serde(flatten)]
    pub body: MessageBody,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl MessageEnvelope {
    /// Build an envelope around `body` with a fresh id and the current time.
    ///
    /// Empty correlation ids and empty metadata maps count as not supplied.
    pub fn base(
        body: MessageBody,
        correlation_id: Option<String>,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            body,
            timestamp: now_timestamp(),
            correlation_id: correlation_id.filter(|id| !id.is_empty()),
            metadata: metadata.filter(|map| !map.is_empty()),
        }
    }

    /// An `event` message wrapping an externally built event object.
    pub fn event(event: Value, correlation_id: Option<String>) -> Self {
        Self::base(MessageBody::Event { event }, correlation_id, None)
    }

    /// A `command` message.
    pub fn command(
        command: impl Into<String>,
        params: Map<String, Value>,
        correlation_id: Option<String>,
    ) -> Self {
        Self::base(
            MessageBody::Command {
                command: CommandPayload {
                    command: command.into(),
                    params,
                },
            },
            correlation_id,
            None,
        )
    }

    /// A `response` message.
    ///
    /// `data` and `error` are taken as given; supplying both is allowed here
    /// and left to schema validation to reject. Empty objects count as absent.
    pub fn response(
        request_id: impl Into<String>,
        status: impl Into<String>,
        data: Option<Value>,
        error: Option<Value>,
    ) -> Self {
        Self::base(
            MessageBody::Response {
                response: ResponsePayload {
                    status: status.into(),
                    request_id: request_id.into(),
                    data: data.filter(is_supplied),
                    error: error.filter(is_supplied),
                },
            },
            None,
            None,
        )
    }

    /// A `heartbeat` message.
    ///
    /// A NaN or infinite uptime has no JSON form and is treated as not supplied.
    pub fn heartbeat(
        agent_id: impl Into<String>,
        status: impl Into<String>,
        uptime_seconds: Option<f64>,
        version: Option<String>,
    ) -> Self {
        Self::base(
            MessageBody::Heartbeat {
                heartbeat: HeartbeatPayload {
                    agent_id: agent_id.into(),
                    status: status.into(),
                    uptime_seconds: uptime_seconds.filter(|u| u.is_finite()),
                    version: version.filter(|v| !v.is_empty()),
                },
            },
            None,
            None,
        )
    }

    /// Attach a correlation id (ignored when empty).
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        let correlation_id = correlation_id.into();
        self.correlation_id = (!correlation_id.is_empty()).then_some(correlation_id);
        self
    }

    /// Attach metadata (ignored when empty).
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = (!metadata.is_empty()).then_some(metadata);
        self
    }

    pub fn message_type(&self) -> MessageType {
        self.body.message_type()
    }

    pub fn as_event(&self) -> Option<&Value> {
        match &self.body {
            MessageBody::Event { event } => Some(event),
            _ => None,
        }
    }

    pub fn as_command(&self) -> Option<&CommandPayload> {
        match &self.body {
            MessageBody::Command { command } => Some(command),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&ResponsePayload> {
        match &self.body {
            MessageBody::Response { response } => Some(response),
            _ => None,
        }
    }

    pub fn as_heartbeat(&self) -> Option<&HeartbeatPayload> {
        match &self.body {
            MessageBody::Heartbeat { heartbeat } => Some(heartbeat),
            _ => None,
        }
    }
}

/// Current UTC time as `2024-05-01T12:30:45.123456Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_supplied(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
