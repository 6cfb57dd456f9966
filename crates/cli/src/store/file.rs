// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed store: one `<key>.json` per key in a data directory.
//!
//! Writes go to a temp file that is fsynced and then renamed over the
//! target, so a crash leaves either the old or the new document.
//! [`KvStore::lock`] takes an `fs2` lock on `.lock` in the same directory,
//! shared by every process opening the store.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::io::AsyncWriteExt;

/// Lock file inside the store directory. Never a key's file name.
const LOCK_FILE: &str = ".lock";

use super::{KvStore, StoreError, StoreFuture, StoreLock, StoreResult};

/// Directory-per-store, file-per-key JSON store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(FileStore {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    async fn read(&self, key: &str) -> StoreResult<Option<Value>> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn write(&self, key: &str, value: &Value) -> StoreResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(value)?;

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn acquire(&self) -> StoreResult<StoreLock> {
        let path = self.dir.join(LOCK_FILE);
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<std::fs::File> {
            use fs2::FileExt;

            let file = std::fs::OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("lock task failed: {}", e)))??;

        Ok(StoreLock {
            _file: Some(file),
            _guard: None,
        })
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map a key to a portable file stem (`draft:survey` → `draft_survey`).
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl KvStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Value>> {
        Box::pin(self.read(key))
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a Value) -> StoreFuture<'a, ()> {
        Box::pin(self.write(key, value))
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(self.delete(key))
    }

    fn lock(&self) -> StoreFuture<'_, StoreLock> {
        Box::pin(self.acquire())
    }
}
