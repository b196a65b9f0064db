//! Basic CLI E2E tests.
//!
//! Each test runs the `habitual` binary against its own data directory.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn habitual(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("habitual").unwrap();
    cmd.env("HABITUAL_HOME", dir.path()).env_remove("RUST_LOG");
    cmd
}

fn add(dir: &TempDir, name: &str, periodicity: &str) {
    habitual(dir)
        .args(["habit", "add", name, "--periodicity", periodicity])
        .assert()
        .success()
        .stdout(predicate::str::contains("Habit created: "));
}

fn list_json(dir: &TempDir) -> serde_json::Value {
    let output = habitual(dir)
        .args(["habit", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_habit_add_and_list() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Read", "daily");
    add(&dir, "Walk", "weekly");

    habitual(&dir)
        .args(["habit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] Read (daily) streak=0 longest=0 last=never"))
        .stdout(predicate::str::contains("[2] Walk (weekly)"));

    let habits = list_json(&dir);
    assert_eq!(habits.as_array().unwrap().len(), 2);
    assert_eq!(habits[0]["periodicity"], "daily");
    assert!(dir.path().join("habitual.db").exists());
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_habit_list_filters_by_periodicity() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Read", "daily");
    add(&dir, "Walk", "weekly");

    habitual(&dir)
        .args(["habit", "list", "--periodicity", "weekly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Walk"))
        .stdout(predicate::str::contains("Read").not());
}

#[test]
fn test_habit_add_rejects_invalid_periodicity() {
    let dir = TempDir::new().unwrap();
    habitual(&dir)
        .args(["habit", "add", "Read", "--periodicity", "monthly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid periodicity 'monthly'"));
}

#[test]
fn test_check_in_scenario() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Read", "daily");

    habitual(&dir)
        .args(["habit", "check", "1", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked in. Streak: 1 (longest 1)"));

    habitual(&dir)
        .args(["habit", "check", "1", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already checked in on 2024-01-01. Streak: 1"));

    habitual(&dir)
        .args(["habit", "check", "1", "--date", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Streak: 2 (longest 2)"));

    habitual(&dir)
        .args(["habit", "check", "1", "--date", "2024-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Streak broken, starting over. Streak: 1 (longest 2)"));

    let output = habitual(&dir).args(["habit", "history", "1"]).output().unwrap();
    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let dates: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-05"]);

    habitual(&dir)
        .args(["habit", "verify", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"consistent\": true"));
}

#[test]
fn test_check_in_rejects_back_dated_and_bad_dates() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Read", "daily");

    habitual(&dir)
        .args(["habit", "check", "1", "--date", "2024-01-05"])
        .assert()
        .success();
    habitual(&dir)
        .args(["habit", "check", "1", "--date", "2024-01-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("earlier than last check-in"));
    habitual(&dir)
        .args(["habit", "check", "1", "--date", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn test_missing_habit_fails() {
    let dir = TempDir::new().unwrap();
    habitual(&dir)
        .args(["habit", "get", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: habit not found: 7"));
    habitual(&dir)
        .args(["habit", "delete", "7"])
        .assert()
        .failure();
}

#[test]
fn test_delete_habit() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Read", "daily");

    habitual(&dir)
        .args(["habit", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Habit deleted: 1"));
    assert_eq!(list_json(&dir).as_array().unwrap().len(), 0);
}

#[test]
fn test_stats_summary() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Read", "daily");
    add(&dir, "Walk", "weekly");
    habitual(&dir)
        .args(["habit", "check", "1", "--date", "2024-01-01"])
        .assert()
        .success();

    let output = habitual(&dir)
        .args(["stats", "--date", "2024-01-02"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["active"], 1);
    assert_eq!(summary["never_checked"], 1);
    assert_eq!(summary["longest"]["name"], "Read");
}

#[test]
fn test_config_get_set_reset() {
    let dir = TempDir::new().unwrap();
    habitual(&dir)
        .args(["config", "get", "habits.default_periodicity"])
        .assert()
        .success()
        .stdout("daily\n");

    habitual(&dir)
        .args(["config", "set", "habits.default_periodicity", "weekly"])
        .assert()
        .success();
    habitual(&dir)
        .args(["habit", "add", "Long run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"periodicity\": \"weekly\""));

    habitual(&dir)
        .args(["config", "set", "logging.level", "chatty"])
        .assert()
        .failure();
    habitual(&dir)
        .args(["config", "get", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key: nope"));

    habitual(&dir).args(["config", "reset"]).assert().success();
    habitual(&dir)
        .args(["config", "get", "habits.default_periodicity"])
        .assert()
        .success()
        .stdout("daily\n");
}

#[test]
fn test_menu_session() {
    let dir = TempDir::new().unwrap();
    habitual(&dir)
        .arg("menu")
        .write_stdin("2\nRead\ndaily\n3\n1\ncheck\n4\n6\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Habit added successfully!"))
        .stdout(predicate::str::contains("Habit checked successfully! Streak: 1"))
        .stdout(predicate::str::contains("[1] Read (daily) streak=1 longest=1"));
}
