// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first delivery of submitted forms.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐ deliver  ┌──────────────────┐      ┌──────────┐
//! │ SubmissionFacade │─────────►│  RemoteSubmitter │─────►│ Endpoint │
//! └────────┬─────────┘          └──────────────────┘      └──────────┘
//!          │ enqueue                     ▲
//!          ▼                             │ submit
//! ┌──────────────────┐  snapshot ┌──────┴───────────┐
//! │   PendingQueue   │◄─────────►│  SyncCoordinator │
//! └──────────────────┘  settle   └──────────────────┘
//!                                        ▲ attempt_sync
//! ┌──────────────────┐  events   ┌──────┴───────────┐
//! │   Connectivity   │──────────►│   SyncService    │
//! │     Monitor      │           │                  │
//! └──────────────────┘           └──────────────────┘
//! ```
//!
//! # Features
//!
//! - Direct delivery when online, durable queue otherwise
//! - Whole-queue passes on connectivity, foreground, startup and enqueue
//! - Rate limiting between attempted passes, bypassed for manual syncs
//! - Retry ceiling and immediate drop of permanent rejections
//! - Injectable submitter, monitor, notifier and clock for testing

mod connectivity;
mod coordinator;
mod facade;
mod notify;
mod queue;
mod service;
mod submitter;

pub use connectivity::{
    ConnectivityMonitor, ConnectivityStatus, MonitorEvent, Probe, ProbeMonitor, SharedMonitor,
};
pub use coordinator::{
    PassReport, PassSummary, SkipReason, SyncCoordinator, SyncParts, SyncSettings, Trigger,
};
pub use facade::{SubmissionFacade, SubmitOutcome};
pub use notify::{LogNotifier, Notification, Notifier};
pub use queue::{PendingQueue, Settlement};
pub use service::{SyncHandle, SyncRequester, SyncService};
pub use submitter::{
    classify_status, submit_path, FailureOutcome, HttpSubmitter, RemoteSubmitter, SubmitFailure,
    SubmitResult, HEALTH_PATH,
};

#[cfg(test)]
pub(crate) mod test_helpers;
