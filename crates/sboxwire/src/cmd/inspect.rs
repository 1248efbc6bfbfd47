use std::fs::File;
use std::io::{self, BufReader, Read};
use std::sync::Arc;

use sboxwire_protocol::{bundled_registry, CodecConfig, FramedJsonCodec, MessageEnvelope};
use sboxwire_schema::SchemaRegistry;
use tracing::{debug, info};

use crate::cmd::{load_registry, InspectArgs};
use crate::exit::{io_error, protocol_error, schema_error, CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let codec = build_codec(&args)?;
    let mut reader = open_input(&args.input)?;

    let mut rows = Vec::new();
    let mut seen = 0usize;
    let outcome = loop {
        if args.count.is_some_and(|limit| seen >= limit) {
            break Ok(());
        }
        match codec.read_message(&mut reader) {
            Ok(Some(message)) => {
                seen += 1;
                match format {
                    OutputFormat::Json => print_json(&message),
                    OutputFormat::Pretty => print_pretty(&message),
                    OutputFormat::Table => rows.push(row(&message)),
                }
            }
            Ok(None) => {
                debug!("end of stream");
                break Ok(());
            }
            Err(err) => break Err(err),
        }
    };

    if format == OutputFormat::Table {
        let mut table = table(&["TYPE", "ID", "TIMESTAMP", "CORRELATION"]);
        for r in rows {
            table.add_row(r);
        }
        println!("{table}");
    }
    info!(messages = seen, "inspected stream");

    outcome
        .map(|()| SUCCESS)
        .map_err(|err| protocol_error(&format!("message {}", seen + 1), err))
}

fn build_codec(args: &InspectArgs) -> CliResult<FramedJsonCodec> {
    let registry = match &args.schemas_dir {
        _ if args.no_validate => Arc::new(SchemaRegistry::new()),
        Some(dir) => Arc::new(load_registry(dir)?),
        None => bundled_registry().map_err(|err| schema_error("bundled schema", err))?,
    };
    let config = CodecConfig {
        validate: !args.no_validate,
        schema_name: args.schema.clone(),
        ..CodecConfig::default()
    };
    Ok(FramedJsonCodec::with_config(registry, config))
}

fn open_input(input: &str) -> CliResult<BufReader<Box<dyn Read>>> {
    let inner: Box<dyn Read> = if input == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(input).map_err(|err| io_error(&format!("open {input}"), err))?)
    };
    Ok(BufReader::new(inner))
}

fn row(message: &MessageEnvelope) -> Vec<String> {
    vec![
        message.message_type().to_string(),
        message.id.clone(),
        message.timestamp.clone(),
        message.correlation_id.clone().unwrap_or_default(),
    ]
}

fn print_pretty(message: &MessageEnvelope) {
    let payload = match serde_json::to_value(&message.body) {
        Ok(mut value) => {
            // `type` is already printed up front.
            if let Some(map) = value.as_object_mut() {
                map.remove("type");
            }
            value.to_string()
        }
        Err(_) => String::new(),
    };
    println!(
        "type={} id={} timestamp={} correlation_id={} payload={}",
        message.message_type(),
        message.id,
        message.timestamp,
        message.correlation_id.as_deref().unwrap_or("-"),
        payload
    );
}
