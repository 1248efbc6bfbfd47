//! `health.*` events. All default to the agent as source.

use sboxwire_protocol::envelope::now_timestamp;
use serde_json::{json, Map, Value};

use crate::event::{Event, EventContext, SOURCE_AGENT};

/// Fields of a `health.alert_triggered` event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alert {
    pub alert_id: String,
    pub severity: String,
    pub message: String,
    pub component: String,
    pub threshold: Option<Map<String, Value>>,
    pub current_value: Option<Map<String, Value>>,
}

/// A component's status moved from `previous_status` to `current_status`.
///
/// The data carries its own timestamp of the transition.
pub fn status_changed(
    component: &str,
    previous_status: &str,
    current_status: &str,
    message: Option<&str>,
    ctx: &EventContext,
) -> Event {
    let mut data = json!({
        "component": component,
        "previous_status": previous_status,
        "current_status": current_status,
        "timestamp": now_timestamp(),
    });
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        data["message"] = json!(message);
    }
    Event::new("health.status_changed", ctx, SOURCE_AGENT).with_data(data)
}

pub fn check_completed(
    check_id: &str,
    overall_status: &str,
    components: Vec<Value>,
    check_duration_ms: Option<u64>,
    errors: Vec<String>,
    ctx: &EventContext,
) -> Event {
    let mut data = json!({
        "check_id": check_id,
        "overall_status": overall_status,
        "components": components,
    });
    if let Some(ms) = check_duration_ms {
        data["check_duration_ms"] = json!(ms);
    }
    if !errors.is_empty() {
        data["errors"] = json!(errors);
    }
    Event::new("health.check_completed", ctx, SOURCE_AGENT).with_data(data)
}

/// New alerts always start unacknowledged.
pub fn alert_triggered(alert: Alert, ctx: &EventContext) -> Event {
    let mut data = json!({
        "alert_id": alert.alert_id,
        "severity": alert.severity,
        "message": alert.message,
        "component": alert.component,
        "acknowledged": false,
    });
    if let Some(threshold) = alert.threshold.filter(|m| !m.is_empty()) {
        data["threshold"] = Value::Object(threshold);
    }
    if let Some(current) = alert.current_value.filter(|m| !m.is_empty()) {
        data["current_value"] = Value::Object(current);
    }
    Event::new("health.alert_triggered", ctx, SOURCE_AGENT).with_data(data)
}
