#![cfg(all(unix, feature = "cli"))]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const AGENT_SCHEMA: &str = r#"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "Agent configuration",
    "version": "1.0.0",
    "type": "object",
    "required": ["agent"],
    "properties": {
        "agent": {
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": { "type": "string" },
                "log_level": { "enum": ["debug", "info", "warn", "error"] }
            }
        }
    }
}"#;

fn sboxwire() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sboxwire"));
    cmd.env_remove("SBOXWIRE_SCHEMAS_DIR")
        .arg("--log-level")
        .arg("error");
    cmd
}

fn schemas_dir(root: &Path) -> std::path::PathBuf {
    let dir = root.join("schemas");
    fs::create_dir_all(&dir).expect("schemas dir should be creatable");
    fs::write(dir.join("agent_config.schema.json"), AGENT_SCHEMA).expect("schema should write");
    dir
}

fn run_verify(schemas: &Path, file: &Path) -> Output {
    sboxwire()
        .args(["--format", "pretty", "verify"])
        .arg(file)
        .arg("--schemas-dir")
        .arg(schemas)
        .output()
        .expect("verify should run")
}

#[test]
fn verify_accepts_valid_yaml_and_json() {
    let root = tempfile::tempdir().expect("tempdir");
    let schemas = schemas_dir(root.path());

    let yaml = root.path().join("agent.yaml");
    fs::write(&yaml, "agent:\n  id: agent-1\n  log_level: info\n").expect("write yaml");
    let output = run_verify(&schemas, &yaml);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed for agent.yaml"));

    let json = root.path().join("agent.json");
    fs::write(&json, r#"{"agent":{"id":"agent-1"}}"#).expect("write json");
    assert_eq!(run_verify(&schemas, &json).status.code(), Some(0));
}

#[test]
fn verify_reports_every_violation_with_path() {
    let root = tempfile::tempdir().expect("tempdir");
    let schemas = schemas_dir(root.path());

    let yaml = root.path().join("agent.yml");
    fs::write(&yaml, "agent:\n  id: 7\n  log_level: loud\n").expect("write yaml");
    let output = run_verify(&schemas, &yaml);

    assert_eq!(output.status.code(), Some(60));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation failed for agent.yml"));
    assert!(stdout.contains("at agent -> id"), "{stdout}");
    assert!(stdout.contains("at agent -> log_level"), "{stdout}");
}

#[test]
fn verify_json_output_lists_violations() {
    let root = tempfile::tempdir().expect("tempdir");
    let schemas = schemas_dir(root.path());
    let file = root.path().join("empty.json");
    fs::write(&file, "{}").expect("write json");

    let output = sboxwire()
        .args(["--format", "json", "verify"])
        .arg(&file)
        .arg("--schemas-dir")
        .arg(&schemas)
        .output()
        .expect("verify should run");

    assert_eq!(output.status.code(), Some(60));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["valid"], false);
    assert_eq!(report["schema"], "agent_config");
    assert_eq!(report["violations"][0]["path"], serde_json::json!([]));
}

#[test]
fn verify_unknown_schema_is_usage_error() {
    let root = tempfile::tempdir().expect("tempdir");
    let schemas = schemas_dir(root.path());
    let file = root.path().join("agent.json");
    fs::write(&file, "{}").expect("write json");

    let output = sboxwire()
        .arg("verify")
        .arg(&file)
        .args(["--schema", "nope", "--schemas-dir"])
        .arg(&schemas)
        .output()
        .expect("verify should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("schema 'nope' not found"));
}

#[test]
fn list_schemas_reports_title_and_version() {
    let root = tempfile::tempdir().expect("tempdir");
    let schemas = schemas_dir(root.path());

    let output = sboxwire()
        .args(["--format", "json", "list-schemas", "--schemas-dir"])
        .arg(&schemas)
        .output()
        .expect("list-schemas should run");

    assert!(output.status.success());
    let list: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(list["schemas"][0]["name"], "agent_config");
    assert_eq!(list["schemas"][0]["version"], "1.0.0");
    assert_eq!(list["schemas"][0]["title"], "Agent configuration");
}

#[test]
fn heartbeat_frame_round_trips_through_inspect() {
    let hb = sboxwire()
        .args(["heartbeat", "agent-123", "--uptime", "3600.5", "--agent-version", "1.0.0"])
        .output()
        .expect("heartbeat should run");
    assert!(hb.status.success());

    let frame = hb.stdout;
    assert_eq!(&frame[4..8], &[0, 0, 0, 1]);
    let len = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    assert_eq!(len + 8, frame.len());

    let mut inspect = sboxwire()
        .args(["--format", "json", "inspect", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("inspect should start");
    {
        let mut stdin = inspect.stdin.take().expect("stdin should be piped");
        stdin.write_all(&frame).expect("write frame");
        stdin.write_all(&frame).expect("write frame");
    }
    let output = inspect.wait_with_output().expect("inspect should finish");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    let message: serde_json::Value = serde_json::from_str(lines[0]).expect("line should be JSON");
    assert_eq!(message["type"], "heartbeat");
    assert_eq!(message["heartbeat"]["agent_id"], "agent-123");
    assert_eq!(message["heartbeat"]["uptime_seconds"], 3600.5);
}

#[test]
fn command_frame_carries_params() {
    let output = sboxwire()
        .args(["command", "reload", "--param", "force=true", "--correlation-id", "c-1"])
        .output()
        .expect("command should run");
    assert!(output.status.success());

    let root = tempfile::tempdir().expect("tempdir");
    let path = root.path().join("frames.bin");
    fs::write(&path, &output.stdout).expect("write frames");

    let inspected = sboxwire()
        .args(["--format", "json", "inspect"])
        .arg(&path)
        .output()
        .expect("inspect should run");
    assert!(inspected.status.success());
    let message: serde_json::Value =
        serde_json::from_slice(&inspected.stdout).expect("stdout should be JSON");
    assert_eq!(message["command"]["command"], "reload");
    assert_eq!(message["command"]["params"]["force"], true);
    assert_eq!(message["correlation_id"], "c-1");
}

#[test]
fn inspect_truncated_frame_is_data_invalid() {
    let hb = sboxwire()
        .args(["heartbeat", "agent-1"])
        .output()
        .expect("heartbeat should run");
    let root = tempfile::tempdir().expect("tempdir");
    let path = root.path().join("cut.bin");
    fs::write(&path, &hb.stdout[..hb.stdout.len() - 3]).expect("write frame");

    let output = sboxwire()
        .arg("inspect")
        .arg(&path)
        .output()
        .expect("inspect should run");

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("incomplete message"));
}

#[test]
fn inspect_rejects_unknown_protocol_version() {
    let root = tempfile::tempdir().expect("tempdir");
    let path = root.path().join("v2.bin");
    let mut bytes = 2u32.to_be_bytes().to_vec();
    bytes.extend_from_slice(&2u32.to_be_bytes());
    bytes.extend_from_slice(b"{}");
    fs::write(&path, bytes).expect("write frame");

    let output = sboxwire()
        .arg("inspect")
        .arg(&path)
        .output()
        .expect("inspect should run");

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported protocol version: 2"));
}

#[test]
fn version_prints_name() {
    let output = sboxwire().arg("version").output().expect("version should run");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("sboxwire "));
}
