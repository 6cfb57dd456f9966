// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! One-shot commands log to stderr at `warn`; `trackmate run` logs to
//! `<data dir>/trackmate.log` at `info`. `-v` raises this crate's level and
//! `RUST_LOG` replaces the filter entirely.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::env;

const CRATES: [&str; 2] = ["tmsync", "tm_core"];

/// Filter directive for a base level and a `-v` count.
pub fn filter_directive(base: &str, verbose: u8) -> String {
    let level = match verbose {
        0 => return base.to_string(),
        1 => "debug",
        _ => "trace",
    };
    let mut directive = base.to_string();
    for name in CRATES {
        directive.push_str(&format!(",{}={}", name, level));
    }
    directive
}

fn filter(base: &str, verbose: u8) -> EnvFilter {
    if env::rust_log_set() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::new(filter_directive(base, verbose))
}

/// Log to stderr.
pub fn setup_stderr_logging(verbose: u8) {
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn", verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to `log_path`, falling back to stderr if it cannot be opened.
pub fn setup_file_logging(log_path: &Path, verbose: u8) {
    let filter = filter("info", verbose);

    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
