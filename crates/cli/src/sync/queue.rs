// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending queue shared through a [`QueueStore`].
//!
//! The store is the source of truth. Other processes may enqueue into or
//! drain the same store, so every read rebases the in-memory copy on the
//! persisted queue, and every mutation re-reads, applies and writes under
//! the store lock. Changes whose write failed are kept as an unsaved delta
//! and replayed on top of each re-read until a write succeeds.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tm_core::{Payload, PendingRecord, RecordId};
use tokio::sync::{Mutex, MutexGuard};

use crate::store::{QueueStore, StoreLock, StoreResult};

/// Outcome of one pass, applied to the queue in a single write.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Records delivered or dropped during the pass.
    pub removed: HashSet<RecordId>,
    /// New attempt counts for records that stay queued.
    pub attempts: HashMap<RecordId, u32>,
}

impl Settlement {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.attempts.is_empty()
    }

    fn apply(&self, records: &mut Vec<PendingRecord>) {
        records.retain(|r| !self.removed.contains(&r.id));
        for record in records.iter_mut() {
            if let Some(&attempts) = self.attempts.get(&record.id) {
                record.attempts = attempts;
            }
        }
    }

    fn absorb(&mut self, other: &Settlement) {
        self.removed.extend(other.removed.iter().cloned());
        self.attempts
            .extend(other.attempts.iter().map(|(id, n)| (id.clone(), *n)));
    }
}

/// Local changes the store has not accepted yet.
#[derive(Debug, Default)]
struct Unsaved {
    added: Vec<PendingRecord>,
    settled: Settlement,
}

impl Unsaved {
    fn is_empty(&self) -> bool {
        self.added.is_empty() && self.settled.is_empty()
    }
}

#[derive(Debug, Default)]
struct QueueState {
    records: Vec<PendingRecord>,
    unsaved: Unsaved,
}

impl QueueState {
    /// Replace the in-memory copy with `persisted` plus unsaved changes.
    fn rebase(&mut self, mut persisted: Vec<PendingRecord>) {
        for record in &self.unsaved.added {
            if !persisted.iter().any(|r| r.id == record.id) {
                persisted.push(record.clone());
            }
        }
        self.unsaved.settled.apply(&mut persisted);
        persisted.sort_by_key(|r| r.enqueued_at);
        self.records = persisted;
    }
}

/// The queue of records waiting for delivery.
pub struct PendingQueue {
    state: Mutex<QueueState>,
    store: QueueStore,
}

impl PendingQueue {
    /// Open the queue, loading whatever the store holds.
    pub async fn open(store: QueueStore) -> Self {
        let records = store.load().await;
        if !records.is_empty() {
            tracing::info!(count = records.len(), "loaded pending records");
        }
        PendingQueue {
            state: Mutex::new(QueueState {
                records,
                unsaved: Unsaved::default(),
            }),
            store,
        }
    }

    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    pub async fn len(&self) -> usize {
        self.current().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.current().await.records.is_empty()
    }

    /// Copy of the queue in delivery order.
    pub async fn snapshot(&self) -> Vec<PendingRecord> {
        self.current().await.records.clone()
    }

    pub async fn contains(&self, id: &RecordId) -> bool {
        self.current().await.records.iter().any(|r| &r.id == id)
    }

    /// Append a new record for `payload` and persist the queue.
    ///
    /// Returns the assigned id. Persistence failures are logged; the record
    /// stays queued in memory either way.
    pub async fn enqueue(&self, payload: Payload, now: DateTime<Utc>) -> RecordId {
        let seed = payload.to_json().unwrap_or_default();
        let (mut state, _lock) = self.begin_update().await;
        let id = RecordId::generate_unique(&seed, &payload.submitted_at(), |candidate| {
            state.records.iter().any(|r| &r.id == candidate)
        });

        let record = PendingRecord::new(id.clone(), payload, now);
        state.records.push(record.clone());
        state.unsaved.added.push(record);
        tracing::debug!(%id, queued = state.records.len(), "enqueued record");

        if let Err(e) = self.persist(&mut state).await {
            tracing::error!(%id, error = %e, "failed to persist pending queue after enqueue");
        }
        id
    }

    /// Apply a pass outcome to the current queue and persist it once.
    ///
    /// Records added after the pass snapshot, here or by another process,
    /// are untouched.
    pub async fn settle(&self, settlement: &Settlement) -> StoreResult<()> {
        if settlement.is_empty() {
            return Ok(());
        }
        let (mut state, _lock) = self.begin_update().await;
        settlement.apply(&mut state.records);
        state.unsaved.settled.absorb(settlement);
        self.persist(&mut state).await
    }

    /// Drop every queued record. Returns how many were removed.
    pub async fn clear(&self) -> StoreResult<usize> {
        let (mut state, _lock) = self.begin_update().await;
        let cleared = Settlement {
            removed: state.records.iter().map(|r| r.id.clone()).collect(),
            attempts: HashMap::new(),
        };
        let count = state.records.len();
        state.records.clear();
        state.unsaved.settled.absorb(&cleared);

        self.store.clear_all().await?;
        state.unsaved = Unsaved::default();
        Ok(count)
    }

    /// In-memory state rebased on the store.
    async fn current(&self) -> MutexGuard<'_, QueueState> {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await;
        state
    }

    /// In-memory state rebased on the store, with the store locked until
    /// the returned lock is dropped.
    async fn begin_update(&self) -> (MutexGuard<'_, QueueState>, Option<StoreLock>) {
        let mut state = self.state.lock().await;
        let lock = match self.store.lock().await {
            Ok(lock) => Some(lock),
            Err(e) => {
                tracing::warn!(error = %e, "failed to lock store, updating queue unlocked");
                None
            }
        };
        self.refresh(&mut state).await;
        (state, lock)
    }

    async fn refresh(&self, state: &mut QueueState) {
        match self.store.try_load().await {
            Ok(persisted) => state.rebase(persisted),
            Err(e) => {
                tracing::warn!(error = %e, "failed to re-read pending records, using memory");
            }
        }
    }

    async fn persist(&self, state: &mut QueueState) -> StoreResult<()> {
        self.store.save_all(&state.records).await?;
        if !state.unsaved.is_empty() {
            tracing::debug!("unsaved queue changes persisted");
        }
        state.unsaved = Unsaved::default();
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
