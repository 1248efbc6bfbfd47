use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::validator::{JsonSchemaValidator, Passthrough, Validate};
use crate::violation::Violation;

const SCHEMA_SUFFIXES: [&str; 2] = [".schema.json", ".json"];

static PASSTHROUGH: Passthrough = Passthrough;

struct Entry {
    document: Value,
    validator: JsonSchemaValidator,
}

/// Name-keyed registry of compiled JSON Schema validators.
///
/// Populate it with the `register*`/`load*` methods, then share it
/// (typically as `Arc<SchemaRegistry>`). Lookups take `&self` only.
pub struct SchemaRegistry {
    entries: BTreeMap<String, Entry>,
    absent: BTreeSet<String>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entries: BTreeMap::new(),
            absent: BTreeSet::new(),
            config,
        }
    }

    /// Register a schema under `name` from a JSON string.
    pub fn register(&mut self, name: &str, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(name, schema)
    }

    /// Register a schema under `name` from a parsed document.
    pub fn register_value(&mut self, name: &str, schema: Value) -> Result<()> {
        let validator = JsonSchemaValidator::compile(name, &schema)?;
        self.absent.remove(name);
        self.entries.insert(
            name.to_string(),
            Entry {
                document: schema,
                validator,
            },
        );
        debug!(schema = name, "registered schema");
        Ok(())
    }

    /// Load one schema file under `name`.
    ///
    /// A missing file is not an error: the name is recorded as absent and
    /// validation against it passes through. Returns whether a schema was loaded.
    pub fn load_file(&mut self, name: &str, path: &Path) -> Result<bool> {
        if !path.exists() {
            debug!(schema = name, path = %path.display(), "schema file not found; passthrough");
            self.absent.insert(name.to_string());
            return Ok(false);
        }

        let content = read_limited(path, self.config.max_schema_file_size)?;
        self.register(name, &content)?;
        Ok(true)
    }

    /// Load every `*.json` schema from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load every `*.json` schema from a directory with explicit config.
    ///
    /// Names are file names without `.schema.json` (or `.json`), so
    /// `protocol_v1.schema.json` registers as `protocol_v1`. A file that is
    /// not valid JSON or not a valid schema is skipped with a warning; I/O
    /// failures, symlinks and limit breaches abort the load.
    pub fn from_directory_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        let mut loaded_schema_count = 0usize;

        let entries = std::fs::read_dir(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            files.push(entry.path());
        }
        files.sort();

        for entry_path in files {
            let file_name = match entry_path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            let Some(name) = schema_name_from_file_name(&file_name) else {
                continue;
            };

            let path_metadata = std::fs::symlink_metadata(&entry_path)
                .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            let file_type = path_metadata.file_type();
            if file_type.is_symlink() {
                return Err(SchemaError::LoadFailed(format!(
                    "refusing to load schema symlink: {file_name}"
                )));
            }
            if !file_type.is_file() {
                continue;
            }

            loaded_schema_count = loaded_schema_count.saturating_add(1);
            if loaded_schema_count > registry.config.max_schemas_from_directory {
                return Err(SchemaError::LoadFailed(format!(
                    "schema count exceeds configured max ({}): {}",
                    registry.config.max_schemas_from_directory, loaded_schema_count
                )));
            }

            let content = read_limited(&entry_path, registry.config.max_schema_file_size)?;
            let schema: Value = match serde_json::from_str(&content) {
                Ok(schema) => schema,
                Err(err) => {
                    warn!(file = %file_name, error = %err, "skipping unparseable schema file");
                    continue;
                }
            };
            match registry.register_value(name, schema) {
                Ok(()) => {}
                Err(err @ SchemaError::CompileFailed { .. }) => {
                    warn!(file = %file_name, error = %err, "skipping schema that failed to compile");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(registry)
    }

    /// Load from embedded `(name, schema)` strings.
    pub fn from_embedded(schemas: &[(&str, &str)]) -> Result<Self> {
        let mut registry = Self::new();
        for (name, schema) in schemas {
            registry.register(name, schema)?;
        }
        Ok(registry)
    }

    /// The validator for `name`: the compiled schema, or [`Passthrough`].
    pub fn validator(&self, name: &str) -> &dyn Validate {
        match self.entries.get(name) {
            Some(entry) => &entry.validator as &dyn Validate,
            None => &PASSTHROUGH as &dyn Validate,
        }
    }

    /// All violations of `instance` against `name`; empty when none or no schema.
    pub fn violations(&self, name: &str, instance: &Value) -> Vec<Violation> {
        let validator = self.validator(name);
        if !validator.is_enforcing() {
            trace!(schema = name, "no schema registered; passthrough");
        }
        validator.violations(instance)
    }

    /// Validate `instance` against the schema registered as `name`.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<()> {
        if self.config.fail_on_missing_schema && !self.has_schema(name) {
            return Err(SchemaError::NoSchema(name.to_string()));
        }

        let violations = self.violations(name, instance);
        if violations.is_empty() {
            return Ok(());
        }
        Err(SchemaError::ValidationFailed {
            schema: name.to_string(),
            violations,
        })
    }

    /// Validate raw JSON bytes against `name`.
    pub fn validate_slice(&self, name: &str, payload: &[u8]) -> Result<()> {
        let value: Value = serde_json::from_slice(payload)?;
        self.validate(name, &value)
    }

    /// Check if a schema is registered under `name`.
    pub fn has_schema(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether `name` was looked up on disk and found missing.
    pub fn is_absent(&self, name: &str) -> bool {
        self.absent.contains(name)
    }

    /// The raw schema document registered under `name`.
    pub fn document(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|entry| &entry.document)
    }

    /// Registered schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("names", &self.names())
            .field("absent", &self.absent)
            .field("config", &self.config)
            .finish()
    }
}

fn schema_name_from_file_name(file_name: &str) -> Option<&str> {
    SCHEMA_SUFFIXES.iter().find_map(|suffix| {
        file_name
            .strip_suffix(suffix)
            .filter(|stem| !stem.is_empty() && !stem.starts_with('.'))
    })
}

fn read_limited(path: &Path, max_bytes: usize) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|err| {
        SchemaError::LoadFailed(format!("failed opening schema {}: {err}", path.display()))
    })?;
    let metadata = file
        .metadata()
        .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
    if metadata.len() > max_bytes as u64 {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large ({} bytes): {}",
            metadata.len(),
            path.display()
        )));
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            SchemaError::LoadFailed(format!("failed reading schema {}: {err}", path.display()))
        })?;
    if content.len() > max_bytes {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large while reading: {}",
            path.display()
        )));
    }
    Ok(content)
}
