// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of one payload to the collection endpoint.
//!
//! Provides a trait-based submitter that enables:
//! - Real HTTP delivery for production
//! - Scripted submitters for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tm_core::{FormKind, Payload};

/// Whether a failed delivery is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Transient: network error, timeout, 5xx, 408, 429.
    Retry,
    /// The endpoint rejected the record; resending will not help.
    Permanent,
}

/// A failed delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct SubmitFailure {
    pub outcome: FailureOutcome,
    pub detail: String,
}

impl SubmitFailure {
    pub fn retry(detail: impl Into<String>) -> Self {
        SubmitFailure {
            outcome: FailureOutcome::Retry,
            detail: detail.into(),
        }
    }

    pub fn permanent(detail: impl Into<String>) -> Self {
        SubmitFailure {
            outcome: FailureOutcome::Permanent,
            detail: detail.into(),
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.outcome == FailureOutcome::Permanent
    }

    /// Failure used when a submit exceeds its time budget.
    pub fn timed_out(after: Duration) -> Self {
        Self::retry(format!("timed out after {}s", after.as_secs_f32()))
    }
}

/// Result type for submit operations.
pub type SubmitResult = Result<(), SubmitFailure>;

/// Sends one payload to the remote endpoint.
pub trait RemoteSubmitter: Send + Sync {
    /// Deliver `payload`. `Ok` means the endpoint acknowledged it.
    fn submit<'a>(
        &'a self,
        payload: &'a Payload,
    ) -> Pin<Box<dyn Future<Output = SubmitResult> + Send + 'a>>;
}

/// Classify an HTTP status. `None` means success.
pub fn classify_status(status: u16) -> Option<FailureOutcome> {
    match status {
        200..=299 => None,
        408 | 429 => Some(FailureOutcome::Retry),
        400..=499 => Some(FailureOutcome::Permanent),
        _ => Some(FailureOutcome::Retry),
    }
}

/// Endpoint path for a form kind.
pub fn submit_path(kind: FormKind) -> &'static str {
    match kind {
        FormKind::IssueReport => "/send-report",
        FormKind::Survey => "/send-survey",
    }
}

/// Health-check path of the collection endpoint.
pub const HEALTH_PATH: &str = "/test";

/// HTTP submitter using reqwest.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
    probe_timeout: Duration,
}

impl HttpSubmitter {
    /// Create a submitter for `endpoint` with a per-request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trackmate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpSubmitter {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            probe_timeout: timeout,
        })
    }

    /// Use a shorter timeout for health probes.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn url_for(&self, kind: FormKind) -> String {
        format!("{}{}", self.endpoint, submit_path(kind))
    }

    /// `GET <endpoint>/test`, returning the HTTP status code.
    pub async fn ping(&self) -> reqwest::Result<u16> {
        let response = self
            .client
            .get(format!("{}{}", self.endpoint, HEALTH_PATH))
            .timeout(self.probe_timeout)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }

    async fn post(&self, payload: &Payload) -> SubmitResult {
        let url = self.url_for(payload.kind());
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmitFailure::retry(format!("request to {} timed out", url))
                } else {
                    SubmitFailure::retry(format!("request to {} failed: {}", url, e))
                }
            })?;

        let status = response.status();
        match classify_status(status.as_u16()) {
            None => Ok(()),
            Some(outcome) => {
                let body = response.text().await.unwrap_or_default();
                let mut detail = format!("server responded {}", status);
                let body = body.trim();
                if !body.is_empty() {
                    detail.push_str(": ");
                    detail.extend(body.chars().take(200));
                }
                Err(SubmitFailure { outcome, detail })
            }
        }
    }
}

impl RemoteSubmitter for HttpSubmitter {
    fn submit<'a>(
        &'a self,
        payload: &'a Payload,
    ) -> Pin<Box<dyn Future<Output = SubmitResult> + Send + 'a>> {
        Box::pin(self.post(payload))
    }
}

#[cfg(test)]
#[path = "submitter_tests.rs"]
mod tests;
