// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record identifiers.
//!
//! Format: `BTF-{YYYYMMDD}-{HHMMSS}-{hash}` where hash is the first 8 hex chars
//! of SHA256(seed + capture timestamp in nanoseconds). Collisions within the
//! queue get an incrementing `-N` suffix.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const ID_PREFIX: &str = "BTF";

/// Identifier of a queued record, stable for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Generate an id from a seed (usually the serialized payload) and a timestamp.
    pub fn generate(seed: &str, created_at: &DateTime<Utc>) -> Self {
        let nanos = created_at.timestamp_nanos_opt().unwrap_or_default();
        let input = format!("{}{}", seed, nanos);
        let hash = Sha256::digest(input.as_bytes());
        let short_hash = hex::encode(&hash[..4]);
        RecordId(format!(
            "{}-{}-{}",
            ID_PREFIX,
            created_at.format("%Y%m%d-%H%M%S"),
            short_hash
        ))
    }

    /// Generate a unique id, appending an incrementing suffix on collision.
    pub fn generate_unique<F>(seed: &str, created_at: &DateTime<Utc>, exists: F) -> Self
    where
        F: Fn(&RecordId) -> bool,
    {
        let base = Self::generate(seed, created_at);
        if !exists(&base) {
            return base;
        }

        let mut suffix = 2;
        loop {
            let id = RecordId(format!("{}-{}", base.0, suffix));
            if !exists(&id) {
                return id;
            }
            suffix += 1;
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check that a string has the shape of a record id.
fn is_valid_id(s: &str) -> bool {
    let mut parts = s.split('-');
    let well_formed = parts.next() == Some(ID_PREFIX)
        && parts
            .next()
            .is_some_and(|p| p.len() == 8 && p.chars().all(|c| c.is_ascii_digit()))
        && parts
            .next()
            .is_some_and(|p| p.len() == 6 && p.chars().all(|c| c.is_ascii_digit()))
        && parts
            .next()
            .is_some_and(|p| p.len() == 8 && p.chars().all(|c| c.is_ascii_hexdigit()));
    if !well_formed {
        return false;
    }
    match (parts.next(), parts.next()) {
        (None, _) => true,
        (Some(suffix), None) => !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if is_valid_id(s) {
            Ok(RecordId(s.to_string()))
        } else {
            Err(Error::InvalidRecordId(s.to_string()))
        }
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        if is_valid_id(&s) {
            Ok(RecordId(s))
        } else {
            Err(Error::InvalidRecordId(s))
        }
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
