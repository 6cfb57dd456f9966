// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence of pending records and the last sync attempt.
//!
//! `load` never fails: a missing or unreadable queue loads as empty and an
//! unreadable timestamp means "never attempted". `try_load` reports read
//! failures so a live queue can keep its own copy instead. Writes report
//! errors so callers can log them.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tm_core::PendingRecord;

use super::{KvStore, StoreError, StoreLock, StoreResult};

/// Key holding the JSON array of pending records.
pub const PENDING_RECORDS_KEY: &str = "pending_records";

/// Key holding the RFC 3339 timestamp of the last attempted pass.
pub const LAST_SYNC_ATTEMPT_KEY: &str = "last_sync_attempt";

/// Queue persistence on top of a [`KvStore`].
#[derive(Clone)]
pub struct QueueStore {
    kv: Arc<dyn KvStore>,
}

impl QueueStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        QueueStore { kv }
    }

    /// Load persisted records, oldest first. A read failure loads as empty.
    pub async fn load(&self) -> Vec<PendingRecord> {
        match self.try_load().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read pending records, starting empty");
                Vec::new()
            }
        }
    }

    /// Load persisted records, oldest first, reporting read failures.
    ///
    /// Malformed entries are skipped and duplicate ids keep the first entry.
    pub async fn try_load(&self) -> StoreResult<Vec<PendingRecord>> {
        let value = match self.kv.get(PENDING_RECORDS_KEY).await? {
            Some(v) => v,
            None => return Ok(Vec::new()),
        };

        let Value::Array(entries) = value else {
            return Err(StoreError::Unavailable(
                "pending records are not a list".to_string(),
            ));
        };

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<PendingRecord>(entry) {
                Ok(record) => {
                    if seen.insert(record.id.clone()) {
                        records.push(record);
                    } else {
                        tracing::warn!(id = %record.id, "skipping duplicate pending record");
                    }
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed pending record");
                }
            }
        }

        records.sort_by_key(|r| r.enqueued_at);
        Ok(records)
    }

    /// Hold the store exclusively while reading and rewriting the queue.
    pub async fn lock(&self) -> StoreResult<StoreLock> {
        self.kv.lock().await
    }

    /// Replace the persisted queue with `records`.
    pub async fn save_all(&self, records: &[PendingRecord]) -> StoreResult<()> {
        let value = serde_json::to_value(records)?;
        self.kv.set(PENDING_RECORDS_KEY, &value).await
    }

    /// Delete every persisted record.
    pub async fn clear_all(&self) -> StoreResult<()> {
        self.kv.remove(PENDING_RECORDS_KEY).await
    }

    /// When the last pass started, if ever.
    pub async fn last_attempt(&self) -> Option<DateTime<Utc>> {
        match self.kv.get(LAST_SYNC_ATTEMPT_KEY).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(at) => Some(at),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unreadable last sync attempt");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last sync attempt");
                None
            }
        }
    }

    /// Record that a pass started at `at`.
    pub async fn set_last_attempt(&self, at: DateTime<Utc>) -> StoreResult<()> {
        let value = serde_json::to_value(at)?;
        self.kv.set(LAST_SYNC_ATTEMPT_KEY, &value).await
    }
}
