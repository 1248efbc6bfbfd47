//! `subscription.*` events.

use serde_json::{json, Value};

use crate::event::{Event, EventContext, SOURCE_AGENT, SOURCE_MANAGER};

/// Optional details of a finished subscription update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateDetails {
    pub error: Option<String>,
    pub nodes_count: Option<u64>,
    pub config_changed: Option<bool>,
}

pub fn created(subscription: Value, ctx: &EventContext) -> Event {
    Event::new("subscription.created", ctx, SOURCE_MANAGER).with_data(subscription)
}

pub fn updated(subscription: Value, ctx: &EventContext) -> Event {
    Event::new("subscription.updated", ctx, SOURCE_MANAGER).with_data(subscription)
}

pub fn deleted(subscription_id: &str, ctx: &EventContext) -> Event {
    by_id("subscription.deleted", subscription_id, ctx, SOURCE_MANAGER)
}

pub fn enabled(subscription_id: &str, ctx: &EventContext) -> Event {
    by_id("subscription.enabled", subscription_id, ctx, SOURCE_MANAGER)
}

pub fn disabled(subscription_id: &str, ctx: &EventContext) -> Event {
    by_id("subscription.disabled", subscription_id, ctx, SOURCE_MANAGER)
}

pub fn update_started(subscription_id: &str, ctx: &EventContext) -> Event {
    by_id("subscription.update_started", subscription_id, ctx, SOURCE_AGENT)
}

pub fn update_completed(
    subscription_id: &str,
    status: &str,
    details: UpdateDetails,
    ctx: &EventContext,
) -> Event {
    let mut data = json!({
        "subscription_id": subscription_id,
        "status": status,
    });
    if let Some(error) = details.error.filter(|e| !e.is_empty()) {
        data["error"] = json!(error);
    }
    if let Some(count) = details.nodes_count {
        data["nodes_count"] = json!(count);
    }
    if let Some(changed) = details.config_changed {
        data["config_changed"] = json!(changed);
    }

    Event::new("subscription.update_completed", ctx, SOURCE_AGENT).with_data(data)
}

fn by_id(event_type: &str, subscription_id: &str, ctx: &EventContext, source: &str) -> Event {
    Event::new(event_type, ctx, source).with_data(json!({ "subscription_id": subscription_id }))
}
