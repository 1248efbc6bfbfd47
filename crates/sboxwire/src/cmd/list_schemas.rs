use sboxwire_schema::SchemaRegistry;
use serde::Serialize;
use serde_json::Value;

use crate::cmd::{load_registry, ListSchemasArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Debug, Serialize, PartialEq)]
struct SchemaSummary {
    name: String,
    version: String,
    title: String,
}

#[derive(Debug, Serialize)]
struct SchemaList {
    schemas: Vec<SchemaSummary>,
}

pub fn run(args: ListSchemasArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = load_registry(&args.schemas_dir)?;
    let list = SchemaList {
        schemas: summarize(&registry),
    };

    match format {
        OutputFormat::Json => print_json(&list),
        OutputFormat::Table => {
            let mut table = table(&["NAME", "VERSION", "TITLE"]);
            for schema in &list.schemas {
                table.add_row(vec![
                    schema.name.clone(),
                    schema.version.clone(),
                    schema.title.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if list.schemas.is_empty() {
                println!("no schemas loaded");
            } else {
                println!("available schemas:");
                for schema in &list.schemas {
                    println!("  - {} (v{}): {}", schema.name, schema.version, schema.title);
                }
            }
        }
    }

    Ok(SUCCESS)
}

/// Name, `version` and `title` of each schema; missing fields fall back to
/// `unknown` and the schema name.
fn summarize(registry: &SchemaRegistry) -> Vec<SchemaSummary> {
    registry
        .names()
        .into_iter()
        .map(|name| {
            let document = registry.document(name);
            let field = |key: &str| document.and_then(|doc| doc.get(key)).map(text);
            SchemaSummary {
                name: name.to_string(),
                version: field("version").unwrap_or_else(|| "unknown".to_string()),
                title: field("title").unwrap_or_else(|| name.to_string()),
            }
        })
        .collect()
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
