use std::{fs, path::PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

fn cli() -> Command {
    let mut command = Command::cargo_bin("jsonguard-cli").expect("Binary is built");
    command.env_remove("JSONGUARD_LOG");
    command
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write file");
    path
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("UTF-8 output")
}

const PERSON: &str = r#"{
    "type": "object",
    "properties": {"age": {"type": "integer", "minimum": 0}},
    "required": ["age"]
}"#;

#[test]
fn valid_instance() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    let schema = write(&dir, "schema.json", PERSON);
    let instance = write(&dir, "instance.json", r#"{"age": 3}"#);
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .output()
        .expect("Command runs");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        format!("{} - VALID\n", instance.display())
    );
}

#[test]
fn invalid_instance() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    let schema = write(&dir, "schema.json", PERSON);
    let valid = write(&dir, "valid.json", r#"{"age": 3}"#);
    let invalid = write(&dir, "invalid.json", r#"{"age": -1}"#);
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&valid)
        .arg("-i")
        .arg(&invalid)
        .output()
        .expect("Command runs");
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains(&format!("{} - VALID", valid.display())), "{text}");
    assert!(
        text.contains(&format!("{} - INVALID. Errors:", invalid.display())),
        "{text}"
    );
    assert!(
        text.contains("1. -1 is less than the minimum of 0 (at '/age', schema '/properties/age/minimum')"),
        "{text}"
    );
}

#[test]
fn json_output() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    let schema = write(&dir, "schema.json", PERSON);
    let instance = write(&dir, "instance.json", "{}");
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .args(["--output", "json"])
        .output()
        .expect("Command runs");
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("JSON report");
    assert_eq!(
        report["result"],
        serde_json::json!({
            "valid": false,
            "errors": [{"path": "", "message": "\"age\" is a required property"}]
        })
    );
}

#[test]
fn flag_output_is_silent() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    let schema = write(&dir, "schema.json", PERSON);
    let instance = write(&dir, "instance.json", r#"{"age": "old"}"#);
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .args(["--output", "flag"])
        .output()
        .expect("Command runs");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn schema_only() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    let schema = write(&dir, "schema.json", PERSON);
    let output = cli().arg(&schema).output().expect("Command runs");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "Schema is valid\n");
}

#[test]
fn relative_references_are_loaded_from_disk() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    fs::create_dir(dir.path().join("defs")).expect("Create directory");
    write(&dir, "defs/name.json", r#"{"type": "string", "minLength": 2}"#);
    let schema = write(
        &dir,
        "schema.json",
        r#"{"properties": {"name": {"$ref": "defs/name.json"}}}"#,
    );
    let valid = write(&dir, "valid.json", r#"{"name": "Bo"}"#);
    let invalid = write(&dir, "invalid.json", r#"{"name": "B"}"#);
    let status = |instance: &PathBuf| {
        cli()
            .arg(&schema)
            .arg("-i")
            .arg(instance)
            .output()
            .expect("Command runs")
            .status
            .code()
    };
    assert_eq!(status(&valid), Some(0));
    assert_eq!(status(&invalid), Some(1));
}

#[test]
fn draft_override() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    let schema = write(&dir, "schema.json", r#"{"maximum": 5, "exclusiveMaximum": true}"#);
    let instance = write(&dir, "instance.json", "5");
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(&instance)
        .args(["--draft", "4"])
        .output()
        .expect("Command runs");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn errors_exit_with_two() {
    let dir = tempfile::tempdir().expect("Temporary directory");
    let malformed = write(&dir, "malformed.json", r#"{"type": "#);
    let invalid_schema = write(&dir, "invalid.json", r#"{"minLength": -1}"#);
    let unresolvable = write(&dir, "unresolvable.json", r#"{"$ref": "missing.json"}"#);
    let instance = write(&dir, "instance.json", "1");

    for schema in [&malformed, &invalid_schema, &unresolvable] {
        let output = cli()
            .arg(schema)
            .arg("-i")
            .arg(&instance)
            .output()
            .expect("Command runs");
        assert_eq!(output.status.code(), Some(2), "{}", schema.display());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Error:"), "{stderr}");
    }

    let schema = write(&dir, "schema.json", PERSON);
    let output = cli()
        .arg(&schema)
        .arg("-i")
        .arg(dir.path().join("absent.json"))
        .output()
        .expect("Command runs");
    assert_eq!(output.status.code(), Some(2));
}
