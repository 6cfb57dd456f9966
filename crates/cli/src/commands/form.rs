// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Turning form JSON (from a file or a draft) into a payload.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tm_core::{FormKind, Payload};

use crate::error::{Error, Result};

/// Text fields of an issue report that validation reports on when empty.
const REPORT_TEXT_FIELDS: [&str; 4] = ["name", "email", "issueType", "comments"];

/// Read a JSON object from `path`.
pub fn read_form(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::InvalidInput(format!("failed to read {}: {}", path.display(), e))
    })?;
    let value: Value = serde_json::from_str(&content)?;
    ensure_object(&value)?;
    Ok(value)
}

pub fn ensure_object(value: &Value) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(Error::FormNotObject {
            found: json_type(value),
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build a `kind` payload from form JSON.
///
/// A `kind` field, if present, must name the same form. `submittedAt`
/// defaults to `now`. Missing report text fields become empty strings so
/// that validation, not deserialization, reports them.
pub fn form_payload(kind: FormKind, form: Value, now: DateTime<Utc>) -> Result<Payload> {
    let mut map = match form {
        Value::Object(map) => map,
        other => {
            return Err(Error::FormNotObject {
                found: json_type(&other),
            })
        }
    };

    if let Some(declared) = map.get("kind") {
        let matches = declared
            .as_str()
            .and_then(|s| s.parse::<FormKind>().ok())
            .is_some_and(|k| k == kind);
        if !matches {
            return Err(Error::FormKindMismatch {
                expected: kind,
                found: declared.to_string(),
            });
        }
    }
    map.insert("kind".to_string(), Value::from(kind.as_str()));
    map.entry("submittedAt")
        .or_insert_with(|| Value::from(now.to_rfc3339()));

    if kind == FormKind::IssueReport {
        for field in REPORT_TEXT_FIELDS {
            map.entry(field).or_insert_with(|| Value::from(""));
        }
    }

    Ok(serde_json::from_value(Value::Object(map))?)
}

#[cfg(test)]
#[path = "form_tests.rs"]
mod tests;
