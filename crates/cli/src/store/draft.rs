// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-progress form drafts, one per form kind.

use std::sync::Arc;

use serde_json::Value;
use tm_core::FormKind;

use super::{KvStore, StoreResult};

/// Draft persistence. Independent of the pending queue.
#[derive(Clone)]
pub struct DraftStore {
    kv: Arc<dyn KvStore>,
}

impl DraftStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        DraftStore { kv }
    }

    pub fn key(kind: FormKind) -> String {
        format!("draft:{}", kind)
    }

    /// Load the saved draft for `kind`. Read failures are logged and yield `None`.
    pub async fn load(&self, kind: FormKind) -> Option<Value> {
        match self.kv.get(&Self::key(kind)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%kind, error = %e, "failed to read draft");
                None
            }
        }
    }

    /// Overwrite the draft for `kind`.
    pub async fn save(&self, kind: FormKind, draft: &Value) -> StoreResult<()> {
        self.kv.set(&Self::key(kind), draft).await
    }

    /// Remove the draft for `kind`.
    pub async fn clear(&self, kind: FormKind) -> StoreResult<()> {
        self.kv.remove(&Self::key(kind)).await
    }
}
