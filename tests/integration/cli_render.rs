#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

const TOP_N_DOC: &str = r#"{"type": "TopN", "frame": "f", "n": 5,
    "filter": {"type": "Bitmap", "id": 1, "frame": "f"},
    "field": "age", "values": [30, 40]}"#;

fn write_doc(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("write document");
    path
}

fn empty_config(dir: &TempDir) -> PathBuf {
    write_doc(dir, "cli.toml", "")
}

#[test]
fn render_prints_pql_for_file() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write_doc(&dir, "top.json", TOP_N_DOC);
    let output = cargo_bin_cmd!("pql")
        .arg("--config")
        .arg(empty_config(&dir))
        .arg("render")
        .arg(&doc)
        .output()
        .expect("run pql");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "TopN(Bitmap(id=1, frame=\"f\"), frame=\"f\", n=5, field=\"age\", [30,40])\n"
    );
}

#[test]
fn render_reads_stdin_and_emits_json() {
    let dir = TempDir::new().expect("tempdir");
    let output = cargo_bin_cmd!("pql")
        .arg("--config")
        .arg(empty_config(&dir))
        .args(["--format", "json", "render"])
        .write_stdin(
            r#"[{"type": "SetBit", "id": 1, "frame": "f", "profileID": 2},
                {"type": "Bitmap", "id": 1, "frame": "f"}]"#,
        )
        .output()
        .expect("run pql");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["write"], Value::Bool(true));
    assert_eq!(
        json["pql"],
        "SetBit(id=1, frame=\"f\", profileID=2)\nBitmap(id=1, frame=\"f\")"
    );
    let queries = json["queries"].as_array().expect("queries array");
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0]["kind"], "SetBit");
    assert_eq!(queries[1]["write"], Value::Bool(false));
}

#[test]
fn check_classifies_queries() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write_doc(
        &dir,
        "batch.json",
        r#"[{"type": "Bitmap", "id": 1, "frame": "f"},
            {"type": "SetProfileAttrs", "id": 3, "attrs": {"name": "ann"}}]"#,
    );
    let output = cargo_bin_cmd!("pql")
        .arg("--config")
        .arg(empty_config(&dir))
        .args(["--color", "never", "check"])
        .arg(&doc)
        .output()
        .expect("run pql");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0: Bitmap (read)"), "stdout: {stdout}");
    assert!(stdout.contains("1: SetProfileAttrs (write)"), "stdout: {stdout}");
    assert!(stdout.contains("2 queries ok, request is write"), "stdout: {stdout}");
}

#[test]
fn validation_errors_exit_non_zero() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write_doc(
        &dir,
        "bad.json",
        r#"{"type": "Difference", "inputs": [
            {"type": "Bitmap", "id": 1, "frame": "f"},
            {"type": "Bitmap", "id": 2, "frame": "f"},
            {"type": "Bitmap", "id": 3, "frame": "f"}
        ]}"#,
    );
    let output = cargo_bin_cmd!("pql")
        .arg("--config")
        .arg(empty_config(&dir))
        .arg("render")
        .arg(&doc)
        .output()
        .expect("run pql");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("number of inputs (3) exceeds input limit (2) for Difference query"),
        "stderr: {stderr}"
    );
}

#[test]
fn config_selects_json_format() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_doc(&dir, "cli.toml", "format = \"json\"\n");
    let output = cargo_bin_cmd!("pql")
        .arg("--config")
        .arg(&config)
        .arg("kinds")
        .output()
        .expect("run pql");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("json output");
    let kinds = json.as_array().expect("kinds array");
    assert_eq!(kinds.len(), 11);
    let difference = kinds
        .iter()
        .find(|k| k["name"] == "Difference")
        .expect("difference listed");
    assert_eq!(difference["input_limit"], 2);
    assert_eq!(difference["write"], Value::Bool(false));
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_doc(&dir, "cli.toml", "format = \"yaml\"\n");
    let output = cargo_bin_cmd!("pql")
        .arg("--config")
        .arg(&config)
        .arg("kinds")
        .output()
        .expect("run pql");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("'yaml' is invalid for 'format'"));
}

#[test]
fn check_rejects_non_identifier_attribute_names() {
    let dir = TempDir::new().expect("tempdir");
    let doc = write_doc(
        &dir,
        "attrs.json",
        r#"{"type": "SetProfileAttrs", "id": 1, "attrs": {"x=1, y": 2}}"#,
    );
    let output = cargo_bin_cmd!("pql")
        .arg("--config")
        .arg(empty_config(&dir))
        .arg("check")
        .arg(&doc)
        .output()
        .expect("run pql");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("attribute name 'x=1, y' for SetProfileAttrs query is not an identifier"),
        "stderr: {stderr}"
    );
}
