//! CLI smoke tests for the tn binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's config, data and working directory
fn tn(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tn").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_config_prints_defaults() {
    let home = TempDir::new().unwrap();

    tn(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("number-of-workers: 10"))
        .stdout(predicate::str::contains("chaos-probability: 0.5"))
        .stdout(predicate::str::contains("inbound-capacity: 64"));
}

#[test]
fn test_config_reads_local_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".tempnet.yml"),
        "network:\n  number-of-workers: 3\n  worker-tick-ms: 250\n",
    )
    .unwrap();

    tn(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("number-of-workers: 3"))
        .stdout(predicate::str::contains("worker-tick-ms: 250"));
}

#[test]
fn test_run_rejects_invalid_config() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.yml");
    std::fs::write(&config, "network:\n  min-temperature: 50.0\n").unwrap();

    tn(&home)
        .arg("--config")
        .arg(&config)
        .args(["run", "--no-store", "--no-display", "--duration", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min-temperature"));
}

#[test]
fn test_run_records_samples() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("fast.yml");
    std::fs::write(
        &config,
        "network:\n  number-of-workers: 2\n  worker-tick-ms: 10\n  coordinator-tick-ms: 50\n",
    )
    .unwrap();
    let samples = home.path().join("samples.jsonl");

    tn(&home)
        .arg("--config")
        .arg(&config)
        .args(["run", "--no-display", "--duration", "1", "--store"])
        .arg(&samples)
        .assert()
        .success()
        .stdout(predicate::str::contains("Shutdown complete"));

    let content = std::fs::read_to_string(&samples).unwrap();
    assert!(content.lines().count() >= 2);
}
