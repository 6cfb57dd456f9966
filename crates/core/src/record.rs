// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Submission payloads and queued records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::RecordId;

/// The type of form a payload or draft belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    IssueReport,
    Survey,
}

impl FormKind {
    pub const ALL: [FormKind; 2] = [FormKind::IssueReport, FormKind::Survey];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::IssueReport => "issue_report",
            FormKind::Survey => "survey",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "issue_report" | "issue-report" | "report" | "issue" => Ok(FormKind::IssueReport),
            "survey" => Ok(FormKind::Survey),
            _ => Err(Error::InvalidFormKind(s.to_string())),
        }
    }
}

/// How urgently a trail issue needs attention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Urgency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            _ => Err(Error::InvalidUrgency(s.to_string())),
        }
    }
}

/// GPS position captured with a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// A trail issue report (fallen tree, damaged sign, water source problem, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_observed: Option<NaiveDate>,
    pub issue_type: String,
    #[serde(default)]
    pub urgency: Urgency,
    /// Free-text description of where the issue is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub comments: String,
    /// Reference to captured media (file path or data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// A visitor survey response.
///
/// Questions vary between survey revisions, so answers are kept as a
/// question-id → JSON value map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit_date: Option<NaiveDate>,
    #[serde(default)]
    pub answers: BTreeMap<String, serde_json::Value>,
    pub submitted_at: DateTime<Utc>,
}

/// A finalized submission body. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    IssueReport(IssueReport),
    Survey(SurveyResponse),
}

impl Payload {
    pub fn kind(&self) -> FormKind {
        match self {
            Payload::IssueReport(_) => FormKind::IssueReport,
            Payload::Survey(_) => FormKind::Survey,
        }
    }

    /// Capture timestamp of the underlying form.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        match self {
            Payload::IssueReport(r) => r.submitted_at,
            Payload::Survey(s) => s.submitted_at,
        }
    }

    /// Serialize to the JSON body sent to the collection endpoint.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A submission waiting for delivery.
///
/// Only `attempts` changes over the record's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRecord {
    pub id: RecordId,
    pub payload: Payload,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
}

impl PendingRecord {
    /// Create a fresh record with zero attempts.
    pub fn new(id: RecordId, payload: Payload, enqueued_at: DateTime<Utc>) -> Self {
        PendingRecord {
            id,
            payload,
            enqueued_at,
            attempts: 0,
        }
    }

    /// Record one failed delivery and return the new attempt count.
    pub fn record_failure(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    /// True once the record has failed `ceiling` times.
    pub fn exhausted(&self, ceiling: u32) -> bool {
        self.attempts >= ceiling
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
