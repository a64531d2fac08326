//! CLI smoke tests for the tempstore binary

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_samples(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("samples.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, r#"{{"workerId":0,"timestamp":"2026-10-18T09:00:00Z","temperature":20.5}}"#).unwrap();
    writeln!(file, r#"{{"workerId":1,"timestamp":"2026-10-18T09:01:00Z","temperature":24.0}}"#).unwrap();
    writeln!(file, r#"{{"workerId":0,"timestamp":"2026-10-18T09:02:00Z","temperature":21.5}}"#).unwrap();
    path
}

#[test]
fn test_list_prints_all_samples() {
    let temp = TempDir::new().unwrap();
    let path = write_samples(&temp);

    Command::cargo_bin("tempstore")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("--path")
        .arg(&path)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("20.50"))
        .stdout(predicate::str::contains("24.00"))
        .stdout(predicate::str::contains("21.50"));
}

#[test]
fn test_range_filters_samples() {
    let temp = TempDir::new().unwrap();
    let path = write_samples(&temp);

    Command::cargo_bin("tempstore")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("--path")
        .arg(&path)
        .args(["range", "2026-10-18T09:01:00Z", "2026-10-18T09:02:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 samples"))
        .stdout(predicate::str::contains("20.50").not());
}

#[test]
fn test_unknown_worker_fails() {
    let temp = TempDir::new().unwrap();
    let path = write_samples(&temp);

    Command::cargo_bin("tempstore")
        .unwrap()
        .arg("--path")
        .arg(&path)
        .args(["worker", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No samples recorded for worker 9"));
}

#[test]
fn test_stats_on_empty_store() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("tempstore")
        .unwrap()
        .arg("--path")
        .arg(temp.path().join("fresh.jsonl"))
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No samples recorded"));
}
