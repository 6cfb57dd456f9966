// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing notifications. Fire-and-forget.

use tm_core::RecordId;

/// Something the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A submission was queued instead of delivered.
    SavedOffline { id: RecordId },
    /// A queued record reached the endpoint.
    Delivered { id: RecordId },
    /// A queued record was given up on.
    Dropped {
        id: RecordId,
        attempts: u32,
        reason: String,
    },
    /// Records remain queued after a pass.
    Pending { count: usize },
}

impl Notification {
    pub fn title(&self) -> &'static str {
        match self {
            Notification::SavedOffline { .. } => "Report Saved Offline",
            Notification::Delivered { .. } => "Report Synced",
            Notification::Dropped { .. } => "Report Not Delivered",
            Notification::Pending { .. } => "Reports Pending",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::SavedOffline { id } => format!(
                "Report {} has been saved and will be submitted when connection is restored.",
                id
            ),
            Notification::Delivered { id } => format!("Report {} was submitted successfully.", id),
            Notification::Dropped {
                id,
                attempts,
                reason,
            } => format!(
                "Report {} could not be delivered after {} attempt(s): {}",
                id, attempts, reason
            ),
            Notification::Pending { count } => {
                format!("{} report(s) waiting for a connection.", count)
            }
        }
    }
}

/// Receives notifications. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Renders notifications through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::Dropped { .. } => {
                tracing::warn!(title = notification.title(), "{}", notification.body())
            }
            _ => tracing::info!(title = notification.title(), "{}", notification.body()),
        }
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
