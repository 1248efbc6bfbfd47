//! Named JSON Schema validation for framed messages.
//!
//! Schemas are JSON Schema 2020-12 documents registered under a logical
//! name (`protocol_v1`, `agent_config`, ...). A registry is filled once at
//! startup and then only read, so it can be shared across connections
//! behind an `Arc` without locking.
//!
//! Validating against a name with no registered schema succeeds. That
//! passthrough is explicit: [`SchemaRegistry::validator`] hands back
//! [`Passthrough`] for unknown names, unless the registry was configured
//! with `fail_on_missing_schema`.

pub mod config;
pub mod error;
pub mod registry;
pub mod validator;
pub mod violation;

pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use registry::SchemaRegistry;
pub use validator::{JsonSchemaValidator, Passthrough, Validate};
pub use violation::{PathSegment, Violation};
