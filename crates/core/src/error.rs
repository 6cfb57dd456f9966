// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tm-core operations.

use thiserror::Error;

/// All possible errors that can occur in tm-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid record id: '{0}'\n  hint: ids look like BTF-20250413-093015-1a2b3c4d")]
    InvalidRecordId(String),

    #[error("invalid form kind: '{0}'\n  hint: valid kinds are: issue_report, survey")]
    InvalidFormKind(String),

    #[error("invalid urgency: '{0}'\n  hint: valid levels are: low, medium, high")]
    InvalidUrgency(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for tm-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
