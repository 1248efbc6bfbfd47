//! Event payloads carried inside `event` envelopes.
//!
//! Builders are grouped by domain ([`subscription`], [`config`], [`health`])
//! and return a plain [`Event`]. Each domain has a default source that a
//! caller can override through [`EventContext`].
//!
//! [`EventConverter`] checks events against the named event schemas. Unlike
//! envelope validation, a missing event schema is an error here.

pub mod config;
pub mod converter;
pub mod error;
pub mod event;
pub mod health;
pub mod subscription;

pub use converter::{
    EventConverter, CONFIG_EVENTS, EVENT_SCHEMA_NAMES, HEALTH_EVENTS, SUBSCRIPTION_EVENTS,
};
pub use error::{EventError, Result};
pub use event::{Event, EventContext, SOURCE_AGENT, SOURCE_MANAGER};
