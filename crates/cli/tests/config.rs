// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn missing_explicit_config_fails() {
    let temp = TempDir::new().unwrap();

    trackmate(&temp)
        .args(["pending", "--config"])
        .arg(temp.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}

#[test]
fn invalid_config_in_data_dir_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("trackmate.toml"), "max_attempts = 0\n").unwrap();

    trackmate(&temp)
        .arg("pending")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_attempts"));
}

#[test]
fn config_max_attempts_shows_in_pending() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("trackmate.toml"), "max_attempts = 3\n").unwrap();
    queue_report(&temp);

    trackmate(&temp)
        .arg("pending")
        .assert()
        .success()
        .stdout(predicate::str::contains("attempts 0/3"));
}

#[test]
fn data_dir_flag_overrides_env() {
    let temp = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    queue_report(&temp);

    trackmate(&temp)
        .arg("pending")
        .arg("--data-dir")
        .arg(other.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending forms"));
}
