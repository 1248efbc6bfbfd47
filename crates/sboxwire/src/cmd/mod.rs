use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use sboxwire_schema::SchemaRegistry;
use tracing::{debug, warn};

use crate::exit::{schema_error, CliResult};
use crate::output::OutputFormat;

pub mod emit;
pub mod inspect;
pub mod list_schemas;
pub mod verify;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a JSON or YAML file against a named schema.
    Verify(VerifyArgs),
    /// List the schemas found in a schemas directory.
    ListSchemas(ListSchemasArgs),
    /// Decode and print the frames in a file or stdin.
    Inspect(InspectArgs),
    /// Write a heartbeat frame to stdout.
    Heartbeat(HeartbeatArgs),
    /// Write a command frame to stdout.
    Command(CommandArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Verify(args) => verify::run(args, format),
        Command::ListSchemas(args) => list_schemas::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Heartbeat(args) => emit::heartbeat(args),
        Command::Command(args) => emit::command(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Configuration file to validate (.json, .yaml or .yml).
    pub file: PathBuf,
    /// Schema name to validate against.
    #[arg(long, default_value = "agent_config")]
    pub schema: String,
    /// Directory containing schemas.
    #[arg(long, value_name = "DIR", default_value = "schemas", env = "SBOXWIRE_SCHEMAS_DIR")]
    pub schemas_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ListSchemasArgs {
    /// Directory containing schemas.
    #[arg(long, value_name = "DIR", default_value = "schemas", env = "SBOXWIRE_SCHEMAS_DIR")]
    pub schemas_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Frame file to read, or `-` for stdin.
    #[arg(default_value = "-")]
    pub input: String,
    /// Load envelope schemas from this directory instead of the bundled one.
    #[arg(long, value_name = "DIR")]
    pub schemas_dir: Option<PathBuf>,
    /// Schema name envelopes are validated against.
    #[arg(long, default_value = "protocol_v1")]
    pub schema: String,
    /// Skip schema validation.
    #[arg(long)]
    pub no_validate: bool,
    /// Stop after N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct HeartbeatArgs {
    /// Agent identifier.
    pub agent_id: String,
    /// Reported status.
    #[arg(long, default_value = "healthy")]
    pub status: String,
    /// Agent uptime in seconds.
    #[arg(long)]
    pub uptime: Option<f64>,
    /// Agent version string.
    #[arg(long)]
    pub agent_version: Option<String>,
    /// Correlation id to attach.
    #[arg(long)]
    pub correlation_id: Option<String>,
    /// Skip validation against the bundled envelope schema.
    #[arg(long)]
    pub no_validate: bool,
}

#[derive(Args, Debug)]
pub struct CommandArgs {
    /// Command name.
    pub name: String,
    /// Parameter as KEY=VALUE; VALUE is parsed as JSON when possible. Repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE", conflicts_with = "params_json")]
    pub params: Vec<String>,
    /// All parameters as one JSON object.
    #[arg(long, value_name = "JSON")]
    pub params_json: Option<String>,
    /// Correlation id to attach.
    #[arg(long)]
    pub correlation_id: Option<String>,
    /// Skip validation against the bundled envelope schema.
    #[arg(long)]
    pub no_validate: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Load every schema in `dir`; a missing directory yields an empty registry.
pub fn load_registry(dir: &Path) -> CliResult<SchemaRegistry> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "schemas directory not found");
        return Ok(SchemaRegistry::new());
    }

    let registry = SchemaRegistry::from_directory(dir)
        .map_err(|err| schema_error(&format!("load schemas from {}", dir.display()), err))?;
    debug!(dir = %dir.display(), count = registry.len(), "loaded schemas");
    Ok(registry)
}
