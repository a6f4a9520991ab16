//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_chronodrift"))
        .args(args)
        .env("CHRONODRIFT_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("JSON output")
}

fn add_task(data_dir: &Path, title: &str) -> String {
    let task = run_json(data_dir, &["task", "add", title]);
    task["id"].as_str().expect("task id").to_string()
}

#[test]
fn test_task_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), "Write tests");

    let tasks = run_json(dir.path(), &["task", "list"]);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], id.as_str());
    assert_eq!(tasks[0]["status"], "pending");
    assert_eq!(tasks[0]["importance"], 3);

    let pending = run_json(dir.path(), &["task", "list", "--status", "completed"]);
    assert!(pending.as_array().unwrap().is_empty());
}

#[test]
fn test_task_complete_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), "Ship it");

    let events = run_json(dir.path(), &["task", "complete", &id]);
    assert_eq!(events[0]["type"], "TaskCompleted");

    let (_, stderr, code) = run_cli(dir.path(), &["task", "complete", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let stats = run_json(dir.path(), &["stats"]);
    assert_eq!(stats["total_tasks_completed"], 1);
}

#[test]
fn test_procrastinate_until_runaway() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), "Someday");

    for _ in 0..4 {
        run_json(dir.path(), &["task", "procrastinate", &id]);
    }
    let events = run_json(dir.path(), &["task", "procrastinate", &id]);
    let kinds: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["TaskRanAway", "AchievementUnlocked"]);

    let task = run_json(dir.path(), &["task", "show", &id]);
    assert_eq!(task["status"], "running-away");
    assert_eq!(task["procrastination_level"], 100);

    let achievements = run_json(dir.path(), &["achievements"]);
    assert_eq!(achievements["unlocked"], 2);
    assert_eq!(achievements["total"], 5);
}

#[test]
fn test_task_update_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), "Draft");

    let task = run_json(
        dir.path(),
        &["task", "update", &id, "--title", "Final", "--importance", "9"],
    );
    assert_eq!(task["title"], "Final");
    assert_eq!(task["importance"], 5);

    run_json(dir.path(), &["task", "delete", &id]);
    let (_, stderr, code) = run_cli(dir.path(), &["task", "show", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("task not found"));
}

#[test]
fn test_focus_runs_short_countdown() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), "Sprint");

    let (stdout, stderr, code) = run_cli(dir.path(), &["focus", &id, "--minutes", "0.01"]);
    assert_eq!(code, 0, "focus failed: {stderr}");
    assert!(stdout.contains("\"type\":\"TimerCompleted\""));
    assert!(stdout.contains("\"type\":\"SessionEnded\""));

    let report_start = stdout.find("{\n").expect("pretty report");
    let report: serde_json::Value = serde_json::from_str(&stdout[report_start..]).unwrap();
    assert_eq!(report["clock_state"], "completed");
    assert_eq!(report["progress"], 1.0);
    assert_eq!(report["remaining_ms"], 0);
    assert_eq!(report["session"]["task_id"], id.as_str());

    let stats = run_json(dir.path(), &["stats"]);
    assert_eq!(stats["sessions"], 1);
    assert_eq!(stats["current_streak"], 1);

    let task = run_json(dir.path(), &["task", "show", &id]);
    assert_eq!(task["status"], "in-progress");
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.default_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.default_minutes", "50"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.default_minutes"]);
    assert_eq!(stdout.trim(), "50");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "timer.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key"));

    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
}
