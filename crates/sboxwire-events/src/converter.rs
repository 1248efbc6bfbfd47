use std::path::Path;
use std::sync::Arc;

use sboxwire_schema::{RegistryConfig, SchemaRegistry};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EventError, Result};
use crate::event::Event;

pub const SUBSCRIPTION_EVENTS: &str = "subscription-events";
pub const CONFIG_EVENTS: &str = "config-events";
pub const HEALTH_EVENTS: &str = "health-events";

/// Event schemas looked up by [`EventConverter::from_directory`].
pub const EVENT_SCHEMA_NAMES: [&str; 3] = [SUBSCRIPTION_EVENTS, CONFIG_EVENTS, HEALTH_EVENTS];

/// Validates events against the loaded event schemas.
#[derive(Debug, Clone)]
pub struct EventConverter {
    registry: Arc<SchemaRegistry>,
}

impl EventConverter {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Load `<name>.json` for each of [`EVENT_SCHEMA_NAMES`] from `dir`.
    ///
    /// Missing files are logged and skipped; events checked against them
    /// later fail with [`EventError::SchemaNotFound`].
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut registry = SchemaRegistry::with_config(RegistryConfig {
            fail_on_missing_schema: true,
            ..RegistryConfig::default()
        });

        for name in EVENT_SCHEMA_NAMES {
            let path = dir.join(format!("{name}.json"));
            if registry.load_file(name, &path)? {
                debug!(schema = name, path = %path.display(), "loaded event schema");
            } else {
                warn!(path = %path.display(), "event schema file not found");
            }
        }

        Ok(Self::new(Arc::new(registry)))
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn has_schema(&self, schema_name: &str) -> bool {
        self.registry.has_schema(schema_name)
    }

    /// Check `event` against `schema_name`.
    pub fn validate_event(&self, event: &Event, schema_name: &str) -> Result<()> {
        self.validate_value(&event.to_value()?, schema_name)
    }

    /// Check a raw event object against `schema_name`.
    pub fn validate_value(&self, event: &Value, schema_name: &str) -> Result<()> {
        if !self.registry.has_schema(schema_name) {
            return Err(EventError::SchemaNotFound(schema_name.to_string()));
        }
        self.registry.validate(schema_name, event)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::event::EventContext;
    use crate::subscription;

    const SUBSCRIPTION_SCHEMA: &str = r#"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["event_id", "timestamp", "source", "event_type", "data"],
        "properties": {
            "event_type": { "type": "string", "pattern": "^subscription\\." },
            "data": {
                "type": "object",
                "required": ["subscription_id"],
                "properties": { "subscription_id": { "type": "string" } }
            }
        }
    }"#;

    fn converter_with_subscription_schema() -> (tempfile::TempDir, EventConverter) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("subscription-events.json"), SUBSCRIPTION_SCHEMA).unwrap();
        let converter = EventConverter::from_directory(dir.path()).unwrap();
        (dir, converter)
    }

    #[test]
    fn loads_only_present_schemas() {
        let (_dir, converter) = converter_with_subscription_schema();

        assert!(converter.has_schema(SUBSCRIPTION_EVENTS));
        assert!(!converter.has_schema(CONFIG_EVENTS));
        assert!(converter.registry().is_absent(HEALTH_EVENTS));
    }

    #[test]
    fn valid_event_passes() {
        let (_dir, converter) = converter_with_subscription_schema();
        let event = subscription::deleted("sub-1", &EventContext::new());
        converter.validate_event(&event, SUBSCRIPTION_EVENTS).unwrap();
    }

    #[test]
    fn invalid_event_reports_violations() {
        let (_dir, converter) = converter_with_subscription_schema();
        let event = subscription::created(json!({"name": "no id"}), &EventContext::new());

        let err = converter
            .validate_event(&event, SUBSCRIPTION_EVENTS)
            .unwrap_err();
        match err {
            EventError::Invalid { schema, violations } => {
                assert_eq!(schema, SUBSCRIPTION_EVENTS);
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].path_display(), "data");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_schema_is_an_error() {
        let (_dir, converter) = converter_with_subscription_schema();
        let event = subscription::deleted("sub-1", &EventContext::new());

        let err = converter.validate_event(&event, HEALTH_EVENTS).unwrap_err();
        assert!(matches!(err, EventError::SchemaNotFound(ref name) if name == HEALTH_EVENTS));
    }

    #[test]
    fn empty_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let converter = EventConverter::from_directory(dir.path()).unwrap();
        assert!(converter.registry().is_empty());
    }
}
