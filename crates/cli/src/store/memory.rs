// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process store for embedding and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{KvStore, StoreError, StoreFuture, StoreLock};

/// Map-backed [`KvStore`]. Reads and writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Release);
    }

    /// Make every subsequent `set`/`remove` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    /// Synchronous peek at a stored value.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    /// Synchronous write, bypassing failure injection.
    pub fn insert(&self, key: &str, value: Value) {
        self.entries().insert(key.to_string(), value);
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::Acquire) {
            Err(StoreError::Unavailable(format!("{} rejected", op)))
        } else {
            Ok(())
        }
    }
}

impl KvStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async move {
            self.check(&self.fail_reads, "read")?;
            Ok(self.peek(key))
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a Value) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.check(&self.fail_writes, "write")?;
            self.insert(key, value.clone());
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.check(&self.fail_writes, "remove")?;
            self.entries().remove(key);
            Ok(())
        })
    }

    fn lock(&self) -> StoreFuture<'_, StoreLock> {
        let writer = self.writer.clone();
        Box::pin(async move {
            Ok(StoreLock {
                _file: None,
                _guard: Some(writer.lock_owned().await),
            })
        })
    }
}
