// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tmsync - offline-first delivery of TrackMate trail reports and surveys.
//!
//! This crate provides the engine behind the `trackmate` CLI: completed
//! forms go straight to the collection server when it is reachable and
//! into a durable queue otherwise, and queued forms are drained whenever
//! connectivity returns.
//!
//! # Main Components
//!
//! - [`store`] - Async key-value persistence ([`FileStore`](store::FileStore)) for the queue and drafts
//! - [`sync`] - Queue, connectivity monitor, submitter, sync coordinator, service loop and facade
//! - [`Config`] - Engine settings from `trackmate.toml`
//! - [`Error`] - Error types for all operations
//!
//! # Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tmsync::store::{DraftStore, FileStore, QueueStore};
//! use tmsync::sync::*;
//!
//! let kv = Arc::new(FileStore::open(&data_dir)?);
//! let queue = Arc::new(PendingQueue::open(QueueStore::new(kv.clone())).await);
//! let parts = SyncParts { queue, monitor, submitter, notifier, clock };
//! let coordinator = Arc::new(SyncCoordinator::new(parts.clone(), SyncSettings::default()));
//! let handle = SyncService::start(coordinator, monitor);
//! let facade = SubmissionFacade::new(parts, DraftStore::new(kv), timeout)
//!     .with_sync(handle.requester());
//! ```

mod cli;
mod commands;
mod env;
mod logging;

pub mod config;
pub mod error;
pub mod store;
pub mod sync;

pub use cli::{Cli, Command, DraftCommand, FormArgs, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use std::fs;

use tm_core::FormKind;

use commands::Context;
use config::{resolve_data_dir, LOG_FILE_NAME};

/// Run a parsed command line to completion.
pub fn run(cli: Cli) -> Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
    if matches!(cli.command, Command::Run) {
        fs::create_dir_all(&data_dir)?;
        logging::setup_file_logging(&data_dir.join(LOG_FILE_NAME), cli.verbose);
    } else {
        logging::setup_stderr_logging(cli.verbose);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let ctx = Context::open(cli.config.as_deref(), Some(data_dir.as_path())).await?;
        dispatch(&ctx, &cli.command).await
    })
}

async fn dispatch(ctx: &Context, command: &Command) -> Result<()> {
    match command {
        Command::Report(args) => commands::submit::run(ctx, FormKind::IssueReport, args).await,
        Command::Survey(args) => commands::submit::run(ctx, FormKind::Survey, args).await,
        Command::Draft { command } => commands::draft::run(ctx, command).await,
        Command::Pending { output } => commands::pending::run(ctx, *output).await,
        Command::Sync { output } => commands::sync::run(ctx, *output).await,
        Command::Run => commands::run::run(ctx).await,
        Command::Clear => commands::clear::run(ctx).await,
        Command::Ping => commands::ping::run(ctx).await,
    }
}
