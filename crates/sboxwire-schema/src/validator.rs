use jsonschema::Validator;
use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::violation::Violation;

/// Checks a JSON instance and reports every violation found.
pub trait Validate: Send + Sync {
    /// Collect all violations; an empty list means the instance conforms.
    fn violations(&self, instance: &Value) -> Vec<Violation>;

    /// Whether this validator actually enforces a schema.
    fn is_enforcing(&self) -> bool {
        true
    }
}

/// Accepts every instance. Used for names with no registered schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Validate for Passthrough {
    fn violations(&self, _instance: &Value) -> Vec<Violation> {
        Vec::new()
    }

    fn is_enforcing(&self) -> bool {
        false
    }
}

/// A compiled JSON Schema 2020-12 document.
pub struct JsonSchemaValidator {
    inner: Validator,
}

impl JsonSchemaValidator {
    /// Compile `schema` under draft 2020-12 regardless of its `$schema` key.
    pub fn compile(name: &str, schema: &Value) -> Result<Self> {
        let inner = jsonschema::draft202012::new(schema).map_err(|err| {
            SchemaError::CompileFailed {
                name: name.to_string(),
                message: err.to_string(),
            }
        })?;
        Ok(Self { inner })
    }
}

impl Validate for JsonSchemaValidator {
    fn violations(&self, instance: &Value) -> Vec<Violation> {
        self.inner
            .iter_errors(instance)
            .map(|err| {
                let pointer = err.instance_path().to_string();
                Violation::from_pointer(err.to_string(), &pointer, instance)
            })
            .collect()
    }
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::violation::PathSegment;

    #[test]
    fn passthrough_accepts_anything() {
        assert!(Passthrough.violations(&json!(null)).is_empty());
        assert!(Passthrough.violations(&json!({"x": [1, 2]})).is_empty());
        assert!(!Passthrough.is_enforcing());
    }

    #[test]
    fn collects_every_violation() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "kind": { "enum": ["event", "command"] }
            },
            "required": ["id", "kind", "timestamp"]
        });
        let validator = JsonSchemaValidator::compile("test", &schema).unwrap();

        let violations = validator.violations(&json!({"id": 5, "kind": "other"}));
        assert_eq!(violations.len(), 3, "{violations:?}");
        assert!(violations
            .iter()
            .any(|v| v.path == vec![PathSegment::Key("id".into())]));
        assert!(violations
            .iter()
            .any(|v| v.path == vec![PathSegment::Key("kind".into())]));
        assert!(violations.iter().any(|v| v.path.is_empty()));
    }

    #[test]
    fn nested_array_paths() {
        let schema = json!({
            "type": "object",
            "properties": {
                "components": {
                    "type": "array",
                    "items": { "type": "object", "required": ["name"] }
                }
            }
        });
        let validator = JsonSchemaValidator::compile("nested", &schema).unwrap();

        let violations = validator.violations(&json!({"components": [{"name": "a"}, {}]}));
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].path,
            vec![PathSegment::Key("components".into()), PathSegment::Index(1)]
        );
    }

    #[test]
    fn invalid_schema_fails_compile() {
        let result = JsonSchemaValidator::compile("broken", &json!({"type": "not-a-type"}));
        assert!(matches!(
            result,
            Err(SchemaError::CompileFailed { ref name, .. }) if name == "broken"
        ));
    }
}
