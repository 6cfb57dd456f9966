// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Field validation for submitted forms.
//!
//! Dates are checked against a caller-supplied "today" so the rules stay
//! deterministic under an injected clock.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::record::{Coordinates, IssueReport, Payload, SurveyResponse};

/// Oldest allowed observation or visit date, in days before today.
pub const MAX_REPORT_AGE_DAYS: u64 = 28;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$") {
    Ok(re) => re,
    Err(_) => unreachable!("static regex pattern"),
});

/// Field name → message for every rule a form broke.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Ok when no rule was broken.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Returns a message if `date` falls outside `[today - 28 days, today]`.
fn check_recent(date: NaiveDate, today: NaiveDate, what: &str) -> Option<String> {
    if date > today {
        return Some(format!("{} cannot be in the future", what));
    }
    let oldest = today
        .checked_sub_days(Days::new(MAX_REPORT_AGE_DAYS))
        .unwrap_or(NaiveDate::MIN);
    if date < oldest {
        return Some(format!("{} must be within the last 4 weeks", what));
    }
    None
}

fn check_coordinates(coords: &Coordinates, errors: &mut ValidationErrors) {
    if !coords.latitude.is_finite() || !(-90.0..=90.0).contains(&coords.latitude) {
        errors.add("coordinates", "latitude must be between -90 and 90");
    }
    if !coords.longitude.is_finite() || !(-180.0..=180.0).contains(&coords.longitude) {
        errors.add("coordinates", "longitude must be between -180 and 180");
    }
    if let Some(accuracy) = coords.accuracy {
        if !accuracy.is_finite() || accuracy < 0.0 {
            errors.add("coordinates", "accuracy must be a non-negative number");
        }
    }
}

/// Validate an issue report as of `today`.
pub fn validate_issue_report(report: &IssueReport, today: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if is_blank(&report.name) {
        errors.add("name", "name is required");
    }

    if is_blank(&report.email) {
        errors.add("email", "email is required");
    } else if !EMAIL_RE.is_match(report.email.trim()) {
        errors.add("email", "please enter a valid email address");
    }

    match report.date_observed {
        None => errors.add("dateObserved", "date observed is required"),
        Some(date) => {
            if let Some(msg) = check_recent(date, today, "date observed") {
                errors.add("dateObserved", msg);
            }
        }
    }

    if is_blank(&report.issue_type) {
        errors.add("issueType", "issue type is required");
    }

    let has_location = report.location.as_deref().is_some_and(|l| !is_blank(l));
    if !has_location && report.coordinates.is_none() {
        errors.add("location", "provide a location description or GPS coordinates");
    }
    if let Some(coords) = &report.coordinates {
        check_coordinates(coords, &mut errors);
    }

    if is_blank(&report.comments) {
        errors.add("comments", "comments are required");
    }

    errors
}

/// Validate a survey response as of `today`.
pub fn validate_survey(survey: &SurveyResponse, today: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if survey.answers.is_empty() {
        errors.add("answers", "at least one question must be answered");
    }

    if let Some(date) = survey.last_visit_date {
        if let Some(msg) = check_recent(date, today, "last visit date") {
            errors.add("lastVisitDate", msg);
        }
    }

    errors
}

/// Validate any payload as of `today`.
pub fn validate_payload(payload: &Payload, today: NaiveDate) -> ValidationErrors {
    match payload {
        Payload::IssueReport(report) => validate_issue_report(report, today),
        Payload::Survey(survey) => validate_survey(survey, today),
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
