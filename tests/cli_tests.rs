//! Integration tests for the anomalo-bootstrap CLI
//!
//! These run the built binary and cover everything that happens before the
//! first network call: argument parsing and credential resolution.

use std::process::Command;
use tempfile::TempDir;

fn bootstrap_binary() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_anomalo-bootstrap"))
}

/// Run the binary with the Anomalo environment variables cleared
fn run_bootstrap(args: &[&str]) -> std::process::Output {
    Command::new(bootstrap_binary())
        .args(args)
        .env_remove("ANOMALO_INSTANCE_HOST")
        .env_remove("ANOMALO_API_SECRET_TOKEN")
        .output()
        .expect("Failed to execute anomalo-bootstrap")
}

#[test]
fn test_version() {
    let output = run_bootstrap(&["--version"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("anomalo-bootstrap"));
}

#[test]
fn test_help_lists_flags() {
    let output = run_bootstrap(&["--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for flag in [
        "--table-file",
        "--out-dir",
        "--anomalo-secret-file",
        "--anomalo-host",
        "--anomalo-token",
        "--executor",
        "--working-dir",
    ] {
        assert!(stdout.contains(flag), "help is missing {}", flag);
    }
}

#[test]
fn test_table_file_is_required() {
    let output = run_bootstrap(&[]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--table-file"));
}

#[test]
fn test_unknown_executor_is_rejected() {
    let output = run_bootstrap(&["--table-file", "tables.txt", "--executor", "pulumi"]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pulumi"));
}

#[test]
fn test_missing_credentials_fail_before_processing() {
    let dir = TempDir::new().unwrap();
    let tables = dir.path().join("tables.txt");
    std::fs::write(&tables, "db.schema.table\n").unwrap();

    let output = run_bootstrap(&[
        "--table-file",
        tables.to_str().unwrap(),
        "--out-dir",
        dir.path().to_str().unwrap(),
    ]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid anomalo secrets"));
    assert!(!dir.path().join("db__schema__table.tf").exists());
}

#[test]
fn test_malformed_secret_file_fails() {
    let dir = TempDir::new().unwrap();
    let secrets = dir.path().join("anomalo.json");
    std::fs::write(&secrets, r#"{"host": "https://anomalo.example.com"}"#).unwrap();

    let output = run_bootstrap(&[
        "--table-file",
        "tables.txt",
        "--anomalo-secret-file",
        secrets.to_str().unwrap(),
    ]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse configuration"));
}

#[test]
fn test_missing_working_dir_fails_before_credentials() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("infra");

    let output = run_bootstrap(&[
        "--table-file",
        "tables.txt",
        "--working-dir",
        missing.to_str().unwrap(),
    ]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Working directory does not exist"));
    assert!(!stderr.contains("is not installed"));
    assert!(!stderr.contains("Invalid anomalo secrets"));
}
