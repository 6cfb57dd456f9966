// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;
use tm_core::{FormKind, ValidationErrors};

use crate::store::StoreError;

/// All possible errors that can occur in the tmsync library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("form rejected: {0}")]
    Validation(ValidationErrors),

    #[error("no saved draft for {0}\n  hint: pass --file or save one with 'trackmate draft save {0} --file <form.json>'")]
    NoDraft(FormKind),

    #[error("form must be a JSON object, found {found}")]
    FormNotObject { found: &'static str },

    #[error("form kind mismatch: expected {expected}, file is {found}")]
    FormKindMismatch { expected: FormKind, found: String },

    #[error("another trackmate process is syncing this data directory ({0})\n  hint: stop the other 'trackmate run' first")]
    Locked(PathBuf),

    #[error("could not determine a data directory\n  hint: pass --data-dir or set TRACKMATE_DATA_DIR")]
    NoDataDir,

    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] tm_core::Error),
}

/// A specialized Result type for tmsync operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
