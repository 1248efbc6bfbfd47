use sboxwire_protocol::{bundled_registry, FramedJsonCodec, MessageEnvelope};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cmd::{CommandArgs, HeartbeatArgs};
use crate::exit::{io_error, protocol_error, schema_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::write_raw;

pub fn heartbeat(args: HeartbeatArgs) -> CliResult<i32> {
    let mut message =
        MessageEnvelope::heartbeat(args.agent_id, args.status, args.uptime, args.agent_version);
    if let Some(id) = args.correlation_id {
        message = message.with_correlation_id(id);
    }
    emit(&codec(args.no_validate)?, &message)
}

pub fn command(args: CommandArgs) -> CliResult<i32> {
    let params = match &args.params_json {
        Some(json) => parse_params_json(json)?,
        None => parse_params(&args.params)?,
    };
    let message = MessageEnvelope::command(args.name, params, args.correlation_id);
    emit(&codec(args.no_validate)?, &message)
}

fn codec(no_validate: bool) -> CliResult<FramedJsonCodec> {
    if no_validate {
        return Ok(FramedJsonCodec::unvalidated());
    }
    let registry = bundled_registry().map_err(|err| schema_error("bundled schema", err))?;
    Ok(FramedJsonCodec::new(registry))
}

fn emit(codec: &FramedJsonCodec, message: &MessageEnvelope) -> CliResult<i32> {
    let frame = codec
        .encode(message)
        .map_err(|err| protocol_error("encode", err))?;
    write_raw(&frame).map_err(|err| io_error("write stdout", err))?;
    debug!(id = %message.id, kind = %message.message_type(), bytes = frame.len(), "emitted frame");
    Ok(SUCCESS)
}

fn parse_params_json(json: &str) -> CliResult<Map<String, Value>> {
    match serde_json::from_str(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CliError::new(USAGE, "--params-json must be a JSON object")),
        Err(err) => Err(CliError::new(USAGE, format!("--params-json: {err}"))),
    }
}

/// `KEY=VALUE` pairs; a VALUE that is not valid JSON is taken as a string.
fn parse_params(pairs: &[String]) -> CliResult<Map<String, Value>> {
    let mut params = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(CliError::new(
                USAGE,
                format!("invalid --param '{pair}': expected KEY=VALUE"),
            ));
        };
        if key.is_empty() {
            return Err(CliError::new(USAGE, format!("invalid --param '{pair}': empty key")));
        }
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        params.insert(key.to_string(), value);
    }
    Ok(params)
}
