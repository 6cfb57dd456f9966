// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on the discard port, so every request fails fast.
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9";

/// `trackmate` isolated in `temp` and pointed at an unreachable endpoint.
pub fn trackmate(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("trackmate");
    cmd.env("TRACKMATE_DATA_DIR", temp.path())
        .env("TRACKMATE_ENDPOINT", UNREACHABLE_ENDPOINT)
        .env_remove("TRACKMATE_CONFIG")
        .env_remove("RUST_LOG")
        .current_dir(temp.path());
    cmd
}

/// A report that passes validation today.
pub fn valid_report() -> Value {
    let observed = Utc::now().date_naive() - Duration::days(1);
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "dateObserved": observed.to_string(),
        "issueType": "fallen_tree",
        "urgency": "high",
        "location": "Mile 12, east fork",
        "comments": "Large oak across the trail"
    })
}

pub fn valid_survey() -> Value {
    json!({ "answers": { "rating": 4, "wouldReturn": true } })
}

/// Write `form` to `<temp>/<name>` and return its path.
pub fn write_form(temp: &TempDir, name: &str, form: &Value) -> PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, form.to_string()).unwrap();
    path
}

/// Queue a report offline and return its id.
pub fn queue_report(temp: &TempDir) -> String {
    let path = write_form(temp, "report.json", &valid_report());
    let output = trackmate(temp)
        .args(["report", "-o", "json", "--file"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    outcome["id"].as_str().unwrap().to_string()
}
