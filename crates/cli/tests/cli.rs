//! Offline CLI tests
//!
//! Argument and pattern errors are reported before any request is sent,
//! so these run without an S3 server.

use std::process::{Command, Output};

use tempfile::TempDir;

fn run_xfer(args: &[&str], config_dir: &TempDir) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xfer"))
        .args(args)
        .env("XFER_CONFIG_DIR", config_dir.path())
        .env_remove("XFER_ENDPOINT_URL")
        .env_remove("XFER_REGION")
        .output()
        .expect("Failed to execute xfer")
}

#[test]
fn test_local_to_local_is_usage_error() {
    let config_dir = TempDir::new().unwrap();
    let output = run_xfer(&["cp", "a.txt", "b.txt"], &config_dir);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must be a storage URI"), "stderr: {stderr}");
}

#[test]
fn test_blank_source_is_usage_error() {
    let config_dir = TempDir::new().unwrap();
    let output = run_xfer(&["cp", "  ", "s3://bucket/key"], &config_dir);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("source is required"));
}

#[test]
fn test_rm_requires_storage_uri() {
    let config_dir = TempDir::new().unwrap();
    let output = run_xfer(&["rm", "local/file.txt"], &config_dir);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_rm_bucket_root_without_recursive_is_usage_error() {
    let config_dir = TempDir::new().unwrap();
    let output = run_xfer(&["rm", "s3://bucket"], &config_dir);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("has no object key"));
}

#[test]
fn test_invalid_include_pattern_json_error() {
    let config_dir = TempDir::new().unwrap();
    let output = run_xfer(
        &["--json", "rm", "-r", "-i", "[abc", "s3://bucket/cats"],
        &config_dir,
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let error: serde_json::Value =
        serde_json::from_slice(&output.stderr).expect("stderr should be JSON");
    assert_eq!(error["exit_code"], 2);
    assert!(error["error"].as_str().unwrap().contains("[abc"));
}

#[test]
fn test_config_from_newer_schema_is_rejected() {
    let config_dir = TempDir::new().unwrap();
    std::fs::write(config_dir.path().join("config.toml"), "schema_version = 99\n").unwrap();

    let output = run_xfer(&["rm", "s3://bucket/key"], &config_dir);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("newer than supported"));
}
