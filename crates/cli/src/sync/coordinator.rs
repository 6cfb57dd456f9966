// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync passes over the pending queue.
//!
//! A pass starts only when no other pass is running, the endpoint is
//! reachable, the minimum interval since the last attempted pass has
//! elapsed (unless the trigger is [`Trigger::Manual`]), and the queue is
//! non-empty. It then submits a snapshot of the queue oldest-first and
//! settles every outcome with one write.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tm_core::Clock;

use super::connectivity::ConnectivityMonitor;
use super::notify::{Notification, Notifier};
use super::queue::{PendingQueue, Settlement};
use super::submitter::{RemoteSubmitter, SubmitFailure};

/// What asked for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Startup,
    Connectivity,
    Foreground,
    Enqueue,
    /// Explicit "sync now". Bypasses the rate limit.
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trigger::Startup => "startup",
            Trigger::Connectivity => "connectivity",
            Trigger::Foreground => "foreground",
            Trigger::Enqueue => "enqueue",
            Trigger::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Why a pass did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadySyncing,
    Offline,
    RateLimited,
    EmptyQueue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::AlreadySyncing => "a sync pass is already running",
            SkipReason::Offline => "offline",
            SkipReason::RateLimited => "last attempt was too recent",
            SkipReason::EmptyQueue => "nothing to sync",
        };
        f.write_str(s)
    }
}

/// Counts from a completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub delivered: usize,
    pub retained: usize,
    pub dropped: usize,
}

/// Result of [`SyncCoordinator::attempt_sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassReport {
    Skipped { reason: SkipReason },
    Completed(PassSummary),
}

impl PassReport {
    /// Records delivered by this pass (zero if skipped).
    pub fn delivered(&self) -> usize {
        match self {
            PassReport::Completed(summary) => summary.delivered,
            PassReport::Skipped { .. } => 0,
        }
    }

    pub fn skipped(&self) -> Option<SkipReason> {
        match self {
            PassReport::Skipped { reason } => Some(*reason),
            PassReport::Completed(_) => None,
        }
    }
}

/// Tunables for sync passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Minimum time between two attempted passes.
    pub min_interval: Duration,
    /// Failed attempts after which a record is dropped.
    pub max_attempts: u32,
    /// Time budget for one submit.
    pub submit_timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            min_interval: Duration::from_secs(5 * 60),
            max_attempts: 5,
            submit_timeout: Duration::from_secs(30),
        }
    }
}

/// Collaborators shared by the coordinator and the submission facade.
#[derive(Clone)]
pub struct SyncParts {
    pub queue: Arc<PendingQueue>,
    pub monitor: Arc<dyn ConnectivityMonitor>,
    pub submitter: Arc<dyn RemoteSubmitter>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

/// Resets the syncing flag when a pass ends, on every path.
struct SyncingGuard<'a>(&'a AtomicBool);

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs sync passes. At most one pass is in flight at a time.
pub struct SyncCoordinator {
    parts: SyncParts,
    settings: SyncSettings,
    syncing: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(parts: SyncParts, settings: SyncSettings) -> Self {
        SyncCoordinator {
            parts,
            settings,
            syncing: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn parts(&self) -> &SyncParts {
        &self.parts
    }

    /// True while a pass is running.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<SyncingGuard<'_>> {
        self.syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncingGuard(&self.syncing))
    }

    async fn rate_limited(&self) -> bool {
        let Some(last) = self.parts.queue.store().last_attempt().await else {
            return false;
        };
        let elapsed = self.parts.clock.now().signed_duration_since(last);
        // A timestamp in the future (clock moved back) does not block syncing.
        match elapsed.to_std() {
            Ok(elapsed) => elapsed < self.settings.min_interval,
            Err(_) => false,
        }
    }

    /// Run one pass if all preconditions hold.
    pub async fn attempt_sync(&self, trigger: Trigger) -> PassReport {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!(%trigger, "sync already in progress");
            return PassReport::Skipped {
                reason: SkipReason::AlreadySyncing,
            };
        };

        let skip = |reason: SkipReason| {
            tracing::debug!(%trigger, %reason, "sync skipped");
            PassReport::Skipped { reason }
        };

        if !self.parts.monitor.current_status().connected {
            return skip(SkipReason::Offline);
        }
        if trigger != Trigger::Manual && self.rate_limited().await {
            return skip(SkipReason::RateLimited);
        }
        if self.parts.queue.is_empty().await {
            return skip(SkipReason::EmptyQueue);
        }

        let started = self.parts.clock.now();
        if let Err(e) = self.parts.queue.store().set_last_attempt(started).await {
            tracing::warn!(error = %e, "failed to persist sync attempt time");
        }

        let summary = self.run_pass(trigger).await;
        PassReport::Completed(summary)
    }

    async fn run_pass(&self, trigger: Trigger) -> PassSummary {
        let snapshot = self.parts.queue.snapshot().await;
        tracing::info!(%trigger, records = snapshot.len(), "sync pass started");

        let mut settlement = Settlement::default();
        let mut summary = PassSummary::default();

        for mut record in snapshot {
            let result = match tokio::time::timeout(
                self.settings.submit_timeout,
                self.parts.submitter.submit(&record.payload),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(SubmitFailure::timed_out(self.settings.submit_timeout)),
            };

            match result {
                Ok(()) => {
                    tracing::info!(id = %record.id, "record delivered");
                    summary.delivered += 1;
                    settlement.removed.insert(record.id.clone());
                    self.parts
                        .notifier
                        .notify(Notification::Delivered { id: record.id });
                }
                Err(failure) => {
                    let attempts = record.record_failure();
                    if failure.is_permanent() || record.exhausted(self.settings.max_attempts) {
                        tracing::warn!(
                            id = %record.id,
                            attempts,
                            permanent = failure.is_permanent(),
                            error = %failure,
                            "dropping record"
                        );
                        summary.dropped += 1;
                        settlement.removed.insert(record.id.clone());
                        self.parts.notifier.notify(Notification::Dropped {
                            id: record.id,
                            attempts,
                            reason: failure.detail,
                        });
                    } else {
                        tracing::info!(
                            id = %record.id,
                            attempts,
                            error = %failure,
                            "delivery failed, will retry"
                        );
                        summary.retained += 1;
                        settlement.attempts.insert(record.id, attempts);
                    }
                }
            }
        }

        if let Err(e) = self.parts.queue.settle(&settlement).await {
            tracing::error!(error = %e, "failed to persist queue after sync pass");
        }

        let remaining = self.parts.queue.len().await;
        if remaining > 0 {
            self.parts
                .notifier
                .notify(Notification::Pending { count: remaining });
        }

        tracing::info!(
            delivered = summary.delivered,
            retained = summary.retained,
            dropped = summary.dropped,
            remaining,
            "sync pass finished"
        );
        summary
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
