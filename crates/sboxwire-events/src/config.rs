//! `config.*` events.

use serde_json::{json, Value};

use crate::event::{Event, EventContext, SOURCE_AGENT, SOURCE_MANAGER};

pub fn created(config: Value, ctx: &EventContext) -> Event {
    Event::new("config.created", ctx, SOURCE_MANAGER).with_data(config)
}

pub fn updated(config: Value, ctx: &EventContext) -> Event {
    Event::new("config.updated", ctx, SOURCE_MANAGER).with_data(config)
}

pub fn deleted(config_id: &str, ctx: &EventContext) -> Event {
    Event::new("config.deleted", ctx, SOURCE_MANAGER).with_data(json!({ "config_id": config_id }))
}

pub fn activated(config_id: &str, previous_config_id: Option<&str>, ctx: &EventContext) -> Event {
    let mut data = json!({ "config_id": config_id });
    if let Some(previous) = previous_config_id.filter(|id| !id.is_empty()) {
        data["previous_config_id"] = json!(previous);
    }
    Event::new("config.activated", ctx, SOURCE_AGENT).with_data(data)
}

pub fn reload_requested(config_id: &str, force: bool, ctx: &EventContext) -> Event {
    Event::new("config.reload_requested", ctx, SOURCE_MANAGER)
        .with_data(json!({ "config_id": config_id, "force": force }))
}

pub fn reload_completed(
    config_id: &str,
    status: &str,
    error: Option<&str>,
    reload_time_ms: Option<u64>,
    ctx: &EventContext,
) -> Event {
    let mut data = json!({ "config_id": config_id, "status": status });
    if let Some(error) = error.filter(|e| !e.is_empty()) {
        data["error"] = json!(error);
    }
    if let Some(ms) = reload_time_ms {
        data["reload_time_ms"] = json!(ms);
    }
    Event::new("config.reload_completed", ctx, SOURCE_AGENT).with_data(data)
}
