use std::path::Path;

use sboxwire_schema::Violation;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cmd::{load_registry, VerifyArgs};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_json, table, OutputFormat};

#[derive(Debug, Serialize)]
struct VerifyReport<'a> {
    file: String,
    schema: &'a str,
    valid: bool,
    violations: Vec<Violation>,
}

pub fn run(args: VerifyArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = load_registry(&args.schemas_dir)?;
    if !registry.has_schema(&args.schema) {
        return Err(CliError::new(
            USAGE,
            format!(
                "schema '{}' not found in {}",
                args.schema,
                args.schemas_dir.display()
            ),
        ));
    }

    let document = load_document(&args.file)?;
    let violations = registry.violations(&args.schema, &document);
    let report = VerifyReport {
        file: display_name(&args.file),
        schema: &args.schema,
        valid: violations.is_empty(),
        violations,
    };
    info!(
        file = %report.file,
        schema = report.schema,
        violations = report.violations.len(),
        "verified document"
    );

    print_report(&report, format);
    Ok(if report.valid { SUCCESS } else { DATA_INVALID })
}

/// Parse a `.json`, `.yaml` or `.yml` file into a JSON value.
fn load_document(path: &Path) -> CliResult<Value> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str) -> Result<Value, String> = match extension.as_deref() {
        Some("json") => |text| serde_json::from_str(text).map_err(|err| err.to_string()),
        Some("yaml" | "yml") => |text| serde_yaml::from_str(text).map_err(|err| err.to_string()),
        other => {
            return Err(CliError::new(
                USAGE,
                format!("unsupported file format: {}", other.unwrap_or("<none>")),
            ))
        }
    };

    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("read {}", path.display()), err))?;
    parse(&text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("parse {}: {err}", path.display()),
        )
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_report(report: &VerifyReport<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            if report.valid {
                println!("validation passed for {}", report.file);
                return;
            }
            let mut table = table(&["PATH", "MESSAGE"]);
            for violation in &report.violations {
                table.add_row(vec![violation.path_display(), violation.message.clone()]);
            }
            println!("validation failed for {}", report.file);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if report.valid {
                println!("validation passed for {}", report.file);
                return;
            }
            println!("validation failed for {}:", report.file);
            for violation in &report.violations {
                println!("  - {violation}");
            }
        }
    }
}
