//! Integration tests for the dma-sim CLI.

use axi_bfm as _;
use dma_sim as _;
use dma_verilated as _;
use serde as _;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use thiserror as _;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("dma-sim")
}

fn create_temp_file(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .output()
        .expect("failed to run dma-sim")
}

#[test]
fn reference_scenario_reports_both_transfers() {
    let output = run(&["--cycles", "200"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("Transfer finished at cycle=").count(), 2);
    assert!(stdout.contains("  REG_STATUS=0x2\n"));
    assert!(stdout.contains("  REG_STATUS=0xa\n"));
    assert!(stdout.contains("  FIFO level=0\n"));
    assert!(stdout.lines().any(|line| line.starts_with("cycle=")));
    assert_eq!(stdout.lines().last(), Some("Simulation finished"));
}

#[test]
fn report_interval_zero_silences_status_lines() {
    let output = run(&["run", "--cycles", "100", "--report-interval", "0"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.lines().any(|line| line.starts_with("cycle=")));
}

#[test]
fn verbose_run_prints_handshakes_to_stderr() {
    let output = run(&["--cycles", "64", "--verbose", "--strict"]);
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("AR addr=0x1000 beats=2"));
    assert!(stderr.contains("AW addr=0x4000 beats=2"));
}

#[test]
fn config_file_selects_transfers() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = create_temp_file(
        temp_dir.path(),
        "sim.json",
        r#"{"run_cycles": 50, "transfers": [{"src": 256, "dst": 512, "length": 96}]}"#,
    );
    let summary = temp_dir.path().join("summary.json");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "--summary",
        summary.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("Transfer finished").count(), 1);

    let json: serde_json::Value = serde_json::from_slice(&fs::read(&summary).unwrap()).unwrap();
    assert_eq!(json["model"], "behavioral");
    assert_eq!(json["report"]["transfers"].as_array().map(Vec::len), Some(1));
}

#[test]
fn invalid_config_exits_with_usage_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = create_temp_file(temp_dir.path(), "bad.json", "{ \"run_cycles\": \"many\" }");

    let output = run(&["--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid config"));
}

#[test]
fn unknown_option_exits_with_usage_error() {
    let output = run(&["--turbo"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unknown option: --turbo"));
    assert!(stderr.contains("Usage: dma-sim"));
}

#[test]
fn tracing_the_behavioral_model_is_a_simulation_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let trace = temp_dir.path().join("sim.vcd");
    let output = run(&["--cycles", "10", "--trace", trace.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("not supported"));
}

#[cfg(not(feature = "verilator"))]
#[test]
fn verilated_model_without_feature_exits_with_usage_error() {
    let output = run(&["--model", "verilated"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("requires building with --features verilator"));
    assert!(output.stdout.is_empty());
}

#[test]
fn help_prints_usage() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("--report-interval"));
}
