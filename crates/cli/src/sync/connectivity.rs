// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity and foreground signals.
//!
//! Consumers read the current status synchronously and subscribe to a
//! broadcast of transitions. Duplicate events are allowed; every consumer
//! must treat them idempotently.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::submitter::HttpSubmitter;

/// Whether the remote endpoint is believed reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectivityStatus {
    pub connected: bool,
}

/// Events published by a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Reachability changed (or was re-reported).
    StatusChanged { connected: bool },
    /// The app returned to the foreground.
    Foreground,
}

/// Source of connectivity state and transition events.
pub trait ConnectivityMonitor: Send + Sync {
    fn current_status(&self) -> ConnectivityStatus;

    /// Receive every event published after this call.
    fn subscribe(&self) -> broadcast::Receiver<MonitorEvent>;
}

/// Monitor state fed by the host shell.
///
/// Uses an atomic flag for lock-free reads from any task.
pub struct SharedMonitor {
    connected: AtomicBool,
    events: broadcast::Sender<MonitorEvent>,
}

impl SharedMonitor {
    pub fn new(connected: bool) -> Self {
        let (events, _) = broadcast::channel(32);
        SharedMonitor {
            connected: AtomicBool::new(connected),
            events,
        }
    }

    /// Record the current reachability and publish it.
    pub fn set_connected(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::AcqRel);
        if was != connected {
            tracing::info!(connected, "connectivity changed");
        }
        // No receivers is fine.
        let _ = self.events.send(MonitorEvent::StatusChanged { connected });
    }

    /// Publish an app-foreground transition.
    pub fn app_foreground(&self) {
        tracing::debug!("app foregrounded");
        let _ = self.events.send(MonitorEvent::Foreground);
    }
}

impl Default for SharedMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConnectivityMonitor for SharedMonitor {
    fn current_status(&self) -> ConnectivityStatus {
        ConnectivityStatus {
            connected: self.connected.load(Ordering::Acquire),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }
}

/// A reachability check against the endpoint.
pub trait Probe: Send + Sync {
    /// `true` if the endpoint answered healthily.
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

impl Probe for HttpSubmitter {
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match self.ping().await {
                Ok(status) => (200..300).contains(&status),
                Err(e) => {
                    tracing::debug!(error = %e, "health probe failed");
                    false
                }
            }
        })
    }
}

/// Periodically probes the endpoint and feeds a [`SharedMonitor`].
pub struct ProbeMonitor {
    monitor: Arc<SharedMonitor>,
    probe: Arc<dyn Probe>,
    interval: Duration,
}

impl ProbeMonitor {
    pub fn new(monitor: Arc<SharedMonitor>, probe: Arc<dyn Probe>, interval: Duration) -> Self {
        ProbeMonitor {
            monitor,
            probe,
            interval,
        }
    }

    /// Probe once and publish the result if it differs from the current status.
    pub async fn probe_once(&self) -> bool {
        let up = self.probe.probe().await;
        if up != self.monitor.current_status().connected {
            self.monitor.set_connected(up);
        }
        up
    }

    /// Run the probe loop until `cancel_token` fires.
    pub fn spawn(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let probe = tokio::select! {
                    _ = cancel_token.cancelled() => return,
                    up = self.probe_once() => up,
                };
                tracing::trace!(up = probe, "probe completed");

                tokio::select! {
                    _ = cancel_token.cancelled() => return,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
