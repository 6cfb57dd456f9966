// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod draft;
pub mod form;
pub mod pending;
pub mod ping;
pub mod run;
pub mod submit;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tm_core::{Clock, SystemClock};

use crate::config::{resolve_config_path, resolve_data_dir, Config, LOCK_FILE_NAME};
use crate::env;
use crate::error::{Error, Result};
use crate::store::{DraftStore, FileStore, KvStore, QueueStore};
use crate::sync::{
    HttpSubmitter, LogNotifier, Notifier, PendingQueue, Probe, ProbeMonitor, RemoteSubmitter,
    SharedMonitor, SubmissionFacade, SyncCoordinator, SyncParts,
};

/// Subdirectory of the data directory holding the key-value store.
const STORE_DIR: &str = "store";

/// Everything a command needs, wired from config and the data directory.
pub struct Context {
    pub config: Config,
    pub data_dir: PathBuf,
    pub queue: Arc<PendingQueue>,
    pub drafts: DraftStore,
    pub monitor: Arc<SharedMonitor>,
    pub submitter: Arc<dyn RemoteSubmitter>,
    pub probe: Arc<dyn Probe>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

impl Context {
    /// Resolve the data directory and config, then open the store.
    pub async fn open(config_flag: Option<&Path>, data_dir_flag: Option<&Path>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir_flag)?;
        let config = load_config(config_flag, &data_dir)?;
        tracing::debug!(data_dir = %data_dir.display(), endpoint = %config.endpoint, "context");

        let kv: Arc<dyn KvStore> = Arc::new(FileStore::open(&data_dir.join(STORE_DIR))?);
        let http = Arc::new(
            HttpSubmitter::new(&config.endpoint, config.submit_timeout())?
                .with_probe_timeout(config.probe_timeout()),
        );
        Ok(Self::assemble(
            config,
            data_dir,
            kv,
            http.clone(),
            http,
            Arc::new(LogNotifier),
            Arc::new(SystemClock),
        )
        .await)
    }

    /// Wire a context from explicit collaborators. The monitor starts offline.
    pub async fn assemble(
        config: Config,
        data_dir: PathBuf,
        kv: Arc<dyn KvStore>,
        submitter: Arc<dyn RemoteSubmitter>,
        probe: Arc<dyn Probe>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let queue = Arc::new(PendingQueue::open(QueueStore::new(kv.clone())).await);
        Context {
            config,
            data_dir,
            queue,
            drafts: DraftStore::new(kv),
            monitor: Arc::new(SharedMonitor::new(false)),
            submitter,
            probe,
            notifier,
            clock,
        }
    }

    pub fn parts(&self) -> SyncParts {
        SyncParts {
            queue: self.queue.clone(),
            monitor: self.monitor.clone(),
            submitter: self.submitter.clone(),
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn coordinator(&self) -> SyncCoordinator {
        SyncCoordinator::new(self.parts(), self.config.sync_settings())
    }

    pub fn facade(&self) -> SubmissionFacade {
        SubmissionFacade::new(
            self.parts(),
            self.drafts.clone(),
            self.config.submit_timeout(),
        )
    }

    pub fn probe_monitor(&self) -> ProbeMonitor {
        ProbeMonitor::new(
            self.monitor.clone(),
            self.probe.clone(),
            self.config.probe_interval(),
        )
    }

    /// Probe the endpoint once and record the result on the monitor.
    pub async fn refresh_connectivity(&self) -> bool {
        self.probe_monitor().probe_once().await
    }

    /// Take the data directory's sync lock. Held by whichever process is
    /// draining the queue.
    pub fn lock_sync(&self) -> Result<File> {
        acquire_lock(&self.data_dir.join(LOCK_FILE_NAME))
    }
}

/// Hold an exclusive lock on `lock_path`, failing if another process has it.
pub(crate) fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    file.try_lock_exclusive()
        .map_err(|_| Error::Locked(lock_path.to_path_buf()))?;
    Ok(file)
}

fn load_config(flag: Option<&Path>, data_dir: &Path) -> Result<Config> {
    let (path, explicit) = resolve_config_path(flag, data_dir);
    let config = if explicit {
        Config::load(&path)?
    } else {
        Config::load_or_default(&path)?
    };
    let config = config.with_endpoint(env::endpoint());
    config.validate()?;
    Ok(config)
}

/// Plural suffix for counts in messages.
fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
