// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable key → JSON storage.
//!
//! The sync engine persists everything through the [`KvStore`] trait:
//! the pending queue under `pending_records`, the rate-limit timestamp under
//! `last_sync_attempt`, and one draft per form under `draft:<kind>`.
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐
//! │ QueueStore  │   │ DraftStore  │
//! └──────┬──────┘   └──────┬──────┘
//!        └───────┬─────────┘
//!                ▼
//!         ┌─────────────┐
//!         │   KvStore   │  FileStore | MemoryStore
//!         └─────────────┘
//! ```

mod draft;
mod file;
mod memory;
mod queue;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

pub use draft::DraftStore;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use queue::{QueueStore, LAST_SYNC_ATTEMPT_KEY, PENDING_RECORDS_KEY};

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future returned by [`KvStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Exclusive hold on a store, released on drop.
///
/// Serializes read-modify-write cycles between every handle on the same
/// store, including handles in other processes for [`FileStore`].
#[derive(Debug, Default)]
pub struct StoreLock {
    _file: Option<std::fs::File>,
    _guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

/// Async key-value store holding JSON documents.
pub trait KvStore: Send + Sync {
    /// Read the value under `key`, or `None` if absent.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Value>>;

    /// Replace the value under `key`.
    fn set<'a>(&'a self, key: &'a str, value: &'a Value) -> StoreFuture<'a, ()>;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;

    /// Wait for exclusive access. Backends without writers elsewhere need
    /// no lock.
    fn lock(&self) -> StoreFuture<'_, StoreLock> {
        Box::pin(async { Ok(StoreLock::default()) })
    }
}
