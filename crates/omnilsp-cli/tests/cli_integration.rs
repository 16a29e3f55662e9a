//! Integration tests for the omnilsp CLI binary.

#![allow(clippy::unwrap_used)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_help_flag() {
    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--backend-url"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_flag() {
    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_config_file_not_found() {
    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    cmd.arg("--config")
        .arg("/nonexistent/path/to/omnilsp.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn test_config_with_invalid_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invalid.toml");

    fs::write(&config_path, "this is not valid TOML {{{{").unwrap();

    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    cmd.arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn test_config_with_unknown_field() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("omnilsp.toml");

    fs::write(&config_path, "[backend]\nretries = 5\n").unwrap();

    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    cmd.arg("--config").arg(&config_path).assert().failure();
}

#[test]
fn test_invalid_backend_url_rejected() {
    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    // Validation runs before the stream opens, so this fails fast.
    cmd.arg("--backend-url")
        .arg("ftp://not-http.example")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_clean_exit_on_closed_stdin() {
    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    // EOF at a frame boundary is a graceful close: exit status 0.
    cmd.arg("--backend-url")
        .arg("http://127.0.0.1:2000")
        .write_stdin("")
        .assert()
        .success();
}

#[test]
fn test_responds_to_initialize_over_stdio() {
    let initialize =
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"capabilities":{}}}"#;
    let exit = r#"{"jsonrpc":"2.0","method":"exit"}"#;
    let input = format!(
        "Content-Length: {}\r\n\r\n{}Content-Length: {}\r\n\r\n{}",
        initialize.len(),
        initialize,
        exit.len(),
        exit
    );

    let mut cmd = Command::cargo_bin("omnilsp").unwrap();

    cmd.arg("--backend-url")
        .arg("http://127.0.0.1:2000")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("completionProvider"))
        .stdout(predicate::str::contains("triggerCharacters"));
}
