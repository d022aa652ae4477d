//! CLI Integration Tests
//!
//! End-to-end tests for CLI commands using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the fleetwatch binary for testing
fn fleetwatch_cmd() -> Command {
    Command::cargo_bin("fleetwatch").unwrap()
}

/// Config with one loopback machine whose only service is on a closed port.
fn write_fleet_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("fleetwatch.toml");
    std::fs::write(
        &path,
        r#"
[probe]
timeout_ms = 500
slow_threshold_ms = 200
host_check_port = 1
host_timeout_ms = 300

[[machines]]
id = "JL1"
host = "127.0.0.1"

[[machines.services]]
name = "Ollama"
port = 1
path = "/api/tags"
category = "ai"
start_cmd = "ollama serve"
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_version_output() {
    fleetwatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleetwatch"));
}

#[test]
fn test_help_shows_all_commands() {
    fleetwatch_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("diagnose"))
        .stdout(predicate::str::contains("unlock"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_serve_help() {
    fleetwatch_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--no-auth"))
        .stdout(predicate::str::contains("--no-feed"));
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("fleetwatch.toml");

    fleetwatch_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success();

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[server]"));
    assert!(content.contains("[[machines]]"));
}

#[test]
fn test_config_init_no_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("fleetwatch.toml");
    std::fs::write(&config_path, "existing content").unwrap();

    fleetwatch_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exists"));

    assert_eq!(
        std::fs::read_to_string(&config_path).unwrap(),
        "existing content"
    );
}

#[test]
fn test_check_json_reports_down_service() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_fleet_config(&temp_dir);

    let output = fleetwatch_cmd()
        .env_remove("FLEETWATCH_UPSTREAM_URL")
        .args(["check", "--json", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["summary"]["up"], 0);
    assert_eq!(json["services"][0]["name"], "Ollama");
    assert_eq!(json["services"][0]["status"], "down");
}

#[test]
fn test_diagnose_prints_fix_steps() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_fleet_config(&temp_dir);

    fleetwatch_cmd()
        .args(["diagnose", "JL1", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("no services are responding"))
        .stdout(predicate::str::contains("Start Ollama: ollama serve"));
}

#[test]
fn test_diagnose_unknown_machine_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_fleet_config(&temp_dir);

    fleetwatch_cmd()
        .args(["diagnose", "JL9", "-c", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown machine: JL9"));
}

#[test]
fn test_unlock_against_missing_dashboard_fails() {
    fleetwatch_cmd()
        .args(["unlock", "--url", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_command() {
    fleetwatch_cmd()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    fleetwatch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}
