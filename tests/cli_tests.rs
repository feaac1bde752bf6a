//! Command line tests for the log-pipeline binary
//!
//! These tests verify:
//! - A small run exits 0 and writes N x W lines
//! - Invalid configuration exits 1
//! - An output file that cannot be opened exits 2

use log_pipeline::core::ParsedLine;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const EXIT_CONFIG: i32 = 1;
const EXIT_FATAL_OPEN: i32 = 2;

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_log-pipeline"))
        .args(args)
        .arg("--no-color")
        .output()
        .expect("Failed to run log-pipeline")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn test_small_run_succeeds() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("output.txt");

    let result = run_cli(&["-n", "2", "-w", "3", "-o", path_arg(&output), "--verify"]);
    assert_eq!(result.status.code(), Some(0), "{:?}", result);

    let content = fs::read_to_string(&output).expect("Failed to read output file");
    let lines: Vec<_> = content
        .lines()
        .map(|l| ParsedLine::parse(l).expect("well-formed line"))
        .collect();
    assert_eq!(lines.len(), 6);

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Producer 0 completed its work."));
    assert!(stdout.contains("Producer 1 completed its work."));
    assert!(stdout.contains("Total execution time:"));
}

#[test]
fn test_json_summary_on_stdout() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("output.txt");

    let result = run_cli(&[
        "-n",
        "3",
        "-w",
        "4",
        "-o",
        path_arg(&output),
        "-l",
        "fatal",
        "--json-summary",
    ]);
    assert_eq!(result.status.code(), Some(0), "{:?}", result);

    let summary: serde_json::Value =
        serde_json::from_slice(&result.stdout).expect("summary is the only stdout");
    assert_eq!(summary["written"], 12);
    assert_eq!(summary["write_failures"], 0);
}

#[test]
fn test_zero_producers_is_config_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("output.txt");

    let result = run_cli(&["--producers", "0", "-o", path_arg(&output)]);
    assert_eq!(result.status.code(), Some(EXIT_CONFIG));
    assert!(!output.exists());
    assert!(String::from_utf8_lossy(&result.stderr).contains("producers"));
}

#[test]
fn test_bad_timestamp_pattern_is_config_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("output.txt");

    let result = run_cli(&["-t", "%Q", "-o", path_arg(&output)]);
    assert_eq!(result.status.code(), Some(EXIT_CONFIG));

    let config = temp_dir.path().join("pipeline.json");
    fs::write(&config, r#"{ "timestamp_format": { "Custom": "%Q" } }"#).expect("write config");
    let result = run_cli(&["-c", path_arg(&config), "-o", path_arg(&output)]);
    assert_eq!(result.status.code(), Some(EXIT_CONFIG));
    assert!(!output.exists());
}

#[test]
fn test_unknown_flag_is_config_error() {
    let result = run_cli(&["--no-such-flag"]);
    assert_eq!(result.status.code(), Some(EXIT_CONFIG));
}

#[test]
fn test_unopenable_output_exits_fatal_open() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("no-such-dir").join("output.txt");

    let result = run_cli(&["-n", "2", "-w", "1000", "-o", path_arg(&output)]);
    assert_eq!(result.status.code(), Some(EXIT_FATAL_OPEN));
    assert!(!output.exists());

    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("FATAL"), "stderr: {}", stderr);
    assert!(stderr.contains("no-such-dir"), "stderr: {}", stderr);
}
