//! The `protocol_v1` envelope schema shipped with this crate.

use std::sync::{Arc, OnceLock};

use sboxwire_schema::{SchemaError, SchemaRegistry};

/// Registry name of the envelope schema.
pub const PROTOCOL_V1: &str = "protocol_v1";

/// Source of the envelope schema (JSON Schema 2020-12).
pub const PROTOCOL_V1_SCHEMA: &str = include_str!("../schemas/protocol_v1.schema.json");

static BUNDLED: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();

/// A process-wide registry holding only `protocol_v1`.
///
/// Compiled on first call and shared afterwards.
pub fn bundled_registry() -> Result<Arc<SchemaRegistry>, SchemaError> {
    if let Some(registry) = BUNDLED.get() {
        return Ok(Arc::clone(registry));
    }

    let registry = Arc::new(SchemaRegistry::from_embedded(&[(
        PROTOCOL_V1,
        PROTOCOL_V1_SCHEMA,
    )])?);
    // A racing thread may have won; either copy is equivalent.
    Ok(Arc::clone(BUNDLED.get_or_init(|| registry)))
}
