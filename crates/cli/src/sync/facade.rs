// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for completed forms.
//!
//! A valid payload is delivered directly when the endpoint is reachable;
//! otherwise, or when direct delivery fails, it is queued and a pass is
//! requested. Either way the form's draft is cleared.

use std::time::Duration;

use serde::Serialize;
use tm_core::{validate_payload, Payload, RecordId, ValidationErrors};

use super::coordinator::{SyncParts, Trigger};
use super::notify::Notification;
use super::service::SyncRequester;
use super::submitter::SubmitFailure;
use crate::store::DraftStore;

/// What happened to a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The form was delivered or queued.
    Accepted {
        id: RecordId,
        delivered_immediately: bool,
    },
    /// The form failed validation; nothing was stored or sent.
    Rejected { errors: ValidationErrors },
}

/// Validates, delivers or queues completed forms.
pub struct SubmissionFacade {
    parts: SyncParts,
    drafts: DraftStore,
    submit_timeout: Duration,
    sync: Option<SyncRequester>,
}

impl SubmissionFacade {
    pub fn new(parts: SyncParts, drafts: DraftStore, submit_timeout: Duration) -> Self {
        SubmissionFacade {
            parts,
            drafts,
            submit_timeout,
            sync: None,
        }
    }

    /// Ask this sync service for a pass after queueing a record.
    pub fn with_sync(mut self, sync: SyncRequester) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    /// Submit a completed form.
    pub async fn submit(&self, payload: Payload) -> SubmitOutcome {
        if let Err(errors) = validate_payload(&payload, self.parts.clock.today()).into_result() {
            tracing::debug!(kind = %payload.kind(), %errors, "form rejected");
            return SubmitOutcome::Rejected { errors };
        }

        let kind = payload.kind();
        let outcome = if self.parts.monitor.current_status().connected {
            match self.deliver(&payload).await {
                Ok(()) => {
                    let id = RecordId::generate(
                        &payload.to_json().unwrap_or_default(),
                        &payload.submitted_at(),
                    );
                    tracing::info!(%id, %kind, "form delivered");
                    SubmitOutcome::Accepted {
                        id,
                        delivered_immediately: true,
                    }
                }
                Err(failure) => {
                    tracing::info!(%kind, error = %failure, "direct delivery failed, queueing");
                    self.queue(payload).await
                }
            }
        } else {
            tracing::info!(%kind, "offline, queueing");
            self.queue(payload).await
        };

        if let Err(e) = self.drafts.clear(kind).await {
            tracing::warn!(%kind, error = %e, "failed to clear draft");
        }
        outcome
    }

    async fn deliver(&self, payload: &Payload) -> Result<(), SubmitFailure> {
        let submit = self.parts.submitter.submit(payload);
        match tokio::time::timeout(self.submit_timeout, submit).await {
            Ok(result) => result,
            Err(_) => Err(SubmitFailure::timed_out(self.submit_timeout)),
        }
    }

    async fn queue(&self, payload: Payload) -> SubmitOutcome {
        let id = self
            .parts
            .queue
            .enqueue(payload, self.parts.clock.now())
            .await;
        self.parts
            .notifier
            .notify(Notification::SavedOffline { id: id.clone() });
        if let Some(sync) = &self.sync {
            sync.request(Trigger::Enqueue);
        }
        SubmitOutcome::Accepted {
            id,
            delivered_immediately: false,
        }
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
