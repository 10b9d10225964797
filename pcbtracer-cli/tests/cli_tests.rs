//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;

/// Build command for the pcbtracer-cli binary (finds it in target/debug when run via cargo test).
fn pcbtracer_cli() -> Command {
    cargo_bin_cmd!("pcbtracer-cli")
}

/// Path to pcbtracer library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("pcbtracer")
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_cli_help() {
    let mut cmd = pcbtracer_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("netlists"));
}

#[test]
fn test_cli_version() {
    let mut cmd = pcbtracer_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_nets_human() {
    let mut cmd = pcbtracer_cli();
    let path = fixtures_dir().join("simple_board.json");

    cmd.arg("nets").arg(path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("N$1 (signal, 3 nodes)"))
        .stdout(predicate::str::contains("GND (ground"))
        .stdout(predicate::str::contains("+3V3 (power"))
        .stdout(predicate::str::contains("R1.1, U1.1"))
        .stdout(predicate::str::contains("U1 pin 4"));
}

#[test]
fn test_cli_nets_json_output() {
    let mut cmd = pcbtracer_cli();
    let path = fixtures_dir().join("simple_board.json");

    cmd.arg("nets").arg(path).arg("--format").arg("json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = value["nets"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["name"].as_str())
        .collect();
    assert_eq!(names, vec!["N$1", "N$2", "GND", "+3V3"]);
    assert_eq!(value["stats"]["unconnected_pins"], 2);
}

#[test]
fn test_cli_nets_prefix_override() {
    let mut cmd = pcbtracer_cli();
    let path = fixtures_dir().join("simple_board.json");

    cmd.arg("nets").arg(path).arg("--prefix").arg("SIG");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SIG1"))
        .stdout(predicate::str::contains("SIG2"))
        .stdout(predicate::str::contains("N$1").not());
}

#[test]
fn test_cli_merge_ground() {
    let path = fixtures_dir().join("split_ground.json");

    let mut cmd = pcbtracer_cli();
    cmd.arg("stats").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Ground nets:    2"));

    let mut cmd = pcbtracer_cli();
    cmd.arg("stats").arg(&path).arg("--merge-ground");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Ground nets:    1"));
}

#[test]
fn test_cli_fail_on_unconnected() {
    let mut cmd = pcbtracer_cli();
    cmd.arg("nets")
        .arg(fixtures_dir().join("simple_board.json"))
        .arg("--fail-on-unconnected");
    cmd.assert().code(1);

    let mut cmd = pcbtracer_cli();
    cmd.arg("nets")
        .arg(fixtures_dir().join("split_ground.json"))
        .arg("--fail-on-unconnected");
    cmd.assert().code(0);
}

#[test]
fn test_cli_node_details() {
    let mut cmd = pcbtracer_cli();
    let path = fixtures_dir().join("simple_board.json");

    cmd.arg("node").arg(path).arg("1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Kind:     component pin"))
        .stdout(predicate::str::contains("Net:      N$1"))
        .stdout(predicate::str::contains("Via:      yes"))
        .stdout(predicate::str::contains("Pins:     R1.1"))
        .stdout(predicate::str::contains("Connected: 2 (component pin)"));
}

#[test]
fn test_cli_node_power_details() {
    let mut cmd = pcbtracer_cli();
    let path = fixtures_dir().join("simple_board.json");

    cmd.arg("node").arg(path).arg("6");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Power:    P1 (+3V3)"));
}

#[test]
fn test_cli_node_shows_drawn_kind_under_ground() {
    let mut cmd = pcbtracer_cli();
    let path = fixtures_dir().join("split_ground.json");

    cmd.arg("node").arg(path).arg("1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Kind:     ground"))
        .stdout(predicate::str::contains("Drawn as: via"));
}

#[test]
fn test_cli_node_unknown_id() {
    let mut cmd = pcbtracer_cli();
    let path = fixtures_dir().join("simple_board.json");

    cmd.arg("node").arg(path).arg("999");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Node 999 not found"));
}

#[test]
fn test_cli_stats_json() {
    let mut cmd = pcbtracer_cli();
    let path = fixtures_dir().join("simple_board.json");

    cmd.arg("stats").arg(path).arg("--format").arg("json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"node_count\": 7"))
        .stdout(predicate::str::contains("\"net_count\": 4"));
}

#[test]
fn test_cli_nonexistent_file() {
    let mut cmd = pcbtracer_cli();

    cmd.arg("nets").arg("does_not_exist.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_invalid_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ \"drawingStrokes\": [ ").unwrap();

    let mut cmd = pcbtracer_cli();
    cmd.arg("nets").arg(file.path());

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn test_cli_duplicate_component_still_traces() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"{
  "drawingStrokes": [ { "id": "v1", "type": "via", "points": [{ "x": 0.0, "y": 0.0, "id": 1 }] } ],
  "components": [
    { "id": "u1", "componentType": "IC", "designator": "U1", "pinConnections": ["1"] },
    { "id": "u1", "componentType": "IC", "designator": "U1", "pinConnections": ["1"] }
  ]
}"#,
    )
    .unwrap();

    let mut cmd = pcbtracer_cli();
    cmd.arg("nets").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("N$1"))
        .stdout(predicate::str::contains("U1.1"));
}

#[test]
fn test_cli_output_formats_are_different() {
    let path = fixtures_dir().join("simple_board.json");

    let mut cmd_human = pcbtracer_cli();
    cmd_human.arg("nets").arg(&path).arg("--format").arg("human");
    let human_output = cmd_human.output().unwrap();

    let mut cmd_json = pcbtracer_cli();
    cmd_json.arg("nets").arg(&path).arg("--format").arg("json");
    let json_output = cmd_json.output().unwrap();

    assert_ne!(
        human_output.stdout,
        json_output.stdout,
        "Different formats should produce different output"
    );
}
