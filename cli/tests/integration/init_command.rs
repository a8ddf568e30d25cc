//! Integration tests for `sidekick init` input handling.
//!
//! Every test points `SIDEKICK_CONFIG` at a temp file and passes `--yes`, so
//! runs never prompt, never touch `~/.config/sidekick`, and stop before any
//! SSH connection is attempted.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sidekick() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sidekick"));
    cmd.env("NO_COLOR", "1").env_remove("SIDEKICK_YES");
    cmd
}

/// Returns a `TempDir` and the path of a config file inside it.
fn temp_config() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("sidekick.yaml");
    (dir, path)
}

fn init(config: &PathBuf) -> Command {
    let mut cmd = sidekick();
    cmd.env("SIDEKICK_CONFIG", config).args(["init", "--yes"]);
    cmd
}

// ---------------------------------------------------------------------------
// Validation failures
// ---------------------------------------------------------------------------

#[test]
fn test_init_invalid_ip_fails_before_connecting() {
    let (_dir, path) = temp_config();
    init(&path)
        .args(["--server", "my-vps.example.com", "--email", "ops@example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("incorrect IP Address"));
}

#[test]
fn test_init_missing_server_without_prompt_fails() {
    let (_dir, path) = temp_config();
    init(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("IPv4 Address"));
}

#[test]
fn test_init_missing_email_fails_before_connecting() {
    let (_dir, path) = temp_config();
    init(&path)
        .args(["--server", "203.0.113.7"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("An email is needed"));
}

#[test]
fn test_init_email_with_spaces_is_rejected() {
    let (_dir, path) = temp_config();
    init(&path)
        .args(["--server", "203.0.113.7", "--email", "ops @example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid email"));
}

#[test]
fn test_init_json_error_is_machine_readable() {
    let (_dir, path) = temp_config();
    let out = init(&path)
        .args(["--json", "--server", "not-an-ip"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).expect("valid JSON");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "input_error");
    assert!(
        value["message"]
            .as_str()
            .unwrap()
            .contains("incorrect IP Address")
    );
}

// ---------------------------------------------------------------------------
// Saved profile values
// ---------------------------------------------------------------------------

#[test]
fn test_init_validates_saved_server_address() {
    let (_dir, path) = temp_config();
    std::fs::write(&path, "serverAddress: localhost\ncertEmail: ops@example.com\n").unwrap();
    init(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("incorrect IP Address"));
}

#[test]
fn test_init_flag_overrides_saved_email_for_validation() {
    let (_dir, path) = temp_config();
    std::fs::write(&path, "serverAddress: 203.0.113.7\ncertEmail: ops@example.com\n").unwrap();
    init(&path)
        .args(["--email", "bad'quote@example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid email"));
}

#[test]
fn test_init_malformed_config_is_reported() {
    let (_dir, path) = temp_config();
    std::fs::write(&path, "serverAddress: [unclosed\n").unwrap();
    init(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

// ---------------------------------------------------------------------------
// Config file is untouched on failure
// ---------------------------------------------------------------------------

#[test]
fn test_init_failure_does_not_create_config() {
    let (_dir, path) = temp_config();
    init(&path).args(["--server", "999.1.1.1"]).assert().code(1);
    assert!(!path.exists(), "config file should not be created");
}

#[test]
fn test_init_failure_leaves_existing_config_unchanged() {
    let (_dir, path) = temp_config();
    let original = "projectName: blog\nserverAddress: 10.0.0.1\n";
    std::fs::write(&path, original).unwrap();
    init(&path).args(["--server", "10.0.0.300"]).assert().code(1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}
