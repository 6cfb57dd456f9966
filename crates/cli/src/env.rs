// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the value of `TRACKMATE_DATA_DIR` if set.
pub fn data_dir() -> Option<PathBuf> {
    non_empty(vars::TRACKMATE_DATA_DIR).map(PathBuf::from)
}

/// Returns the value of `TRACKMATE_ENDPOINT` if set.
pub fn endpoint() -> Option<String> {
    non_empty(vars::TRACKMATE_ENDPOINT)
}

/// Returns the value of `TRACKMATE_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::TRACKMATE_CONFIG).map(PathBuf::from)
}

/// Returns `true` if `RUST_LOG` is set (any value).
pub fn rust_log_set() -> bool {
    std::env::var(vars::RUST_LOG).is_ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
