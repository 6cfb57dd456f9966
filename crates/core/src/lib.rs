// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tm-core: Shared data model for the TrackMate sync engine
//!
//! This crate provides the submission payloads, record identifiers, clock
//! abstraction, and form validation used by the `trackmate` sync library.

pub mod clock;
pub mod error;
pub mod id;
pub mod record;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use id::RecordId;
pub use record::{
    Coordinates, FormKind, IssueReport, Payload, PendingRecord, SurveyResponse, Urgency,
};
pub use validate::{validate_issue_report, validate_payload, validate_survey, ValidationErrors};
