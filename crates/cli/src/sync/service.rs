// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background task that turns triggers into sync passes.
//!
//! Monitor events and explicit requests are funnelled into one channel,
//! consumed by one task, so passes never overlap and bursts of triggers
//! collapse into a single pass.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::connectivity::{ConnectivityMonitor, MonitorEvent};
use super::coordinator::{SyncCoordinator, Trigger};

const TRIGGER_CAPACITY: usize = 16;

/// Cloneable handle for asking the service to run a pass.
#[derive(Debug, Clone)]
pub struct SyncRequester {
    tx: mpsc::Sender<Trigger>,
}

impl SyncRequester {
    /// Queue a trigger. Returns `false` if it was coalesced into pending
    /// triggers or the service has stopped.
    pub fn request(&self, trigger: Trigger) -> bool {
        match self.tx.try_send(trigger) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::trace!(%trigger, "trigger coalesced");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(%trigger, "sync service stopped, trigger ignored");
                false
            }
        }
    }
}

/// Running sync service.
pub struct SyncHandle {
    requester: SyncRequester,
    cancel_token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn request(&self, trigger: Trigger) -> bool {
        self.requester.request(trigger)
    }

    pub fn requester(&self) -> SyncRequester {
        self.requester.clone()
    }

    /// Stop the service. An in-flight pass finishes first.
    pub async fn stop(self) {
        self.cancel_token.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "sync task ended abnormally");
            }
        }
    }
}

/// Entry point for the sync service.
pub struct SyncService;

impl SyncService {
    /// Spawn the service and request a startup pass.
    pub fn start(
        coordinator: Arc<SyncCoordinator>,
        monitor: Arc<dyn ConnectivityMonitor>,
    ) -> SyncHandle {
        let (tx, rx) = mpsc::channel(TRIGGER_CAPACITY);
        let cancel_token = CancellationToken::new();
        let requester = SyncRequester { tx };

        // Subscribe before spawning so no event published after start is missed.
        let events = monitor.subscribe();
        let forwarder = tokio::spawn(forward_events(
            events,
            requester.clone(),
            cancel_token.clone(),
        ));
        let runner = tokio::spawn(run_passes(coordinator, rx, cancel_token.clone()));

        requester.request(Trigger::Startup);
        tracing::info!("sync service started");

        SyncHandle {
            requester,
            cancel_token,
            tasks: vec![forwarder, runner],
        }
    }
}

/// Map monitor events onto triggers.
fn trigger_for(event: MonitorEvent) -> Option<Trigger> {
    match event {
        MonitorEvent::StatusChanged { connected: true } => Some(Trigger::Connectivity),
        MonitorEvent::StatusChanged { connected: false } => None,
        MonitorEvent::Foreground => Some(Trigger::Foreground),
    }
}

async fn forward_events(
    mut events: broadcast::Receiver<MonitorEvent>,
    requester: SyncRequester,
    cancel_token: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel_token.cancelled() => return,
            event = events.recv() => event,
        };

        match event {
            Ok(event) => {
                if let Some(trigger) = trigger_for(event) {
                    requester.request(trigger);
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::debug!(missed, "monitor events lagged");
                requester.request(Trigger::Connectivity);
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

async fn run_passes(
    coordinator: Arc<SyncCoordinator>,
    mut rx: mpsc::Receiver<Trigger>,
    cancel_token: CancellationToken,
) {
    loop {
        let trigger = tokio::select! {
            _ = cancel_token.cancelled() => break,
            trigger = rx.recv() => match trigger {
                Some(trigger) => trigger,
                None => break,
            },
        };

        // Collapse everything already waiting into this pass. A manual
        // request among them keeps its rate-limit bypass.
        let mut trigger = trigger;
        while let Ok(next) = rx.try_recv() {
            if next == Trigger::Manual {
                trigger = Trigger::Manual;
            }
        }

        let report = coordinator.attempt_sync(trigger).await;
        tracing::debug!(%trigger, ?report, "trigger handled");
    }
    tracing::info!("sync service stopped");
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
