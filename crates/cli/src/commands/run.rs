// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running sync: probe the endpoint and drain the queue whenever it
//! becomes reachable, until interrupted.
//!
//! On Unix, `SIGUSR1` is treated as the app returning to the foreground
//! and asks for a pass.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Context;
use crate::error::Result;
use crate::sync::{SyncHandle, SyncService};

pub async fn run(ctx: &Context) -> Result<()> {
    let _lock = ctx.lock_sync()?;

    let runner = Runner::start(ctx).await;
    println!(
        "Syncing to {} every {}s while reachable (Ctrl-C to stop)",
        ctx.config.endpoint, ctx.config.probe_interval_secs
    );

    let signal = wait_for_shutdown(ctx).await;
    tracing::info!("shutting down");
    runner.stop().await;
    signal?;
    Ok(())
}

/// Wait for Ctrl-C, forwarding `SIGUSR1` as a foreground event meanwhile.
#[cfg(unix)]
async fn wait_for_shutdown(ctx: &Context) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut wake = signal(SignalKind::user_defined1())?;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            result = &mut ctrl_c => return result,
            Some(()) = wake.recv() => {
                tracing::info!("SIGUSR1 received");
                ctx.monitor.app_foreground();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown(_ctx: &Context) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Probe loop plus sync service.
pub(crate) struct Runner {
    cancel_token: CancellationToken,
    probe_task: JoinHandle<()>,
    sync: SyncHandle,
}

impl Runner {
    pub(crate) async fn start(ctx: &Context) -> Self {
        // Probe first so the startup pass sees the real status.
        ctx.refresh_connectivity().await;

        let cancel_token = CancellationToken::new();
        let probe_task = ctx.probe_monitor().spawn(cancel_token.clone());
        let sync = SyncService::start(Arc::new(ctx.coordinator()), ctx.monitor.clone());
        tracing::info!(endpoint = %ctx.config.endpoint, "sync running");
        Runner {
            cancel_token,
            probe_task,
            sync,
        }
    }

    pub(crate) async fn stop(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.probe_task.await {
            tracing::warn!(error = %e, "probe task ended abnormally");
        }
        self.sync.stop().await;
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
