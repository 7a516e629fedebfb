//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomotide"))
        .args(args)
        .env("POMOTIDE_DATA_DIR", data_dir)
        .env_remove("POMOTIDE_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn status_json(data_dir: &Path) -> serde_json::Value {
    let (code, stdout, _) = run_cli(data_dir, &["timer", "status", "--json"]);
    assert_eq!(code, 0, "Timer status failed");
    serde_json::from_str(&stdout).expect("status is not JSON")
}

#[test]
fn test_timer_status_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let json = status_json(dir.path());
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["countdown"], "00:00");
}

#[test]
fn test_timer_start() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["timer", "start"]);
    assert_eq!(code, 0, "Timer start failed");
    assert!(stdout.contains("Work"));

    let json = status_json(dir.path());
    assert_eq!(json["phase"], "working");
    let remaining = json["remaining_seconds"].as_u64().unwrap();
    assert!(remaining <= 1500 && remaining > 1400);
}

#[test]
fn test_timer_pause_resume() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["timer", "rest"]);
    let (code, stdout, _) = run_cli(dir.path(), &["timer", "pause"]);
    assert_eq!(code, 0, "Timer pause failed");
    assert!(stdout.contains("Rest (paused)"));

    let (code, _, _) = run_cli(dir.path(), &["timer", "resume"]);
    assert_eq!(code, 0, "Timer resume failed");
    assert_eq!(status_json(dir.path())["phase"], "resting");
}

#[test]
fn test_timer_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["timer", "start"]);
    let (code, _, _) = run_cli(dir.path(), &["timer", "reset"]);
    assert_eq!(code, 0, "Timer reset failed");
    assert_eq!(status_json(dir.path())["phase"], "idle");
}

#[test]
fn test_config_get() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "timer.rest_duration_minutes"]);
    assert_eq!(code, 0, "Config get failed");
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_set_rescales_running_timer() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["timer", "start"]);
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "timer.session_duration_minutes", "10"]);
    assert_eq!(code, 0, "Config set failed");

    let json = status_json(dir.path());
    assert_eq!(json["session_duration_minutes"], 10);
    assert!(json["remaining_seconds"].as_u64().unwrap() <= 600);
}

#[test]
fn test_config_set_rejects_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "timer.session_duration_minutes", "121"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_list() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0, "Config list failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["behavior"]["auto_start_rest"], false);
}

#[test]
fn test_stats_show() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["stats", "show", "--json"]);
    assert_eq!(code, 0, "Stats show failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["session_count"], 0);
}
