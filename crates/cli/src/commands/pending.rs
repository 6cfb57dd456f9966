// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::Serialize;
use tm_core::PendingRecord;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PendingList {
    pub count: usize,
    pub last_sync_attempt: Option<DateTime<Utc>>,
    pub records: Vec<PendingRecord>,
}

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let list = run_impl(ctx).await;
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Text => println!("{}", format_text(&list, ctx.config.max_attempts)),
    }
    Ok(())
}

pub(crate) async fn run_impl(ctx: &Context) -> PendingList {
    let records = ctx.queue.snapshot().await;
    PendingList {
        count: records.len(),
        last_sync_attempt: ctx.queue.store().last_attempt().await,
        records,
    }
}

pub(crate) fn format_text(list: &PendingList, max_attempts: u32) -> String {
    if list.records.is_empty() {
        return "No pending forms".to_string();
    }
    let mut lines: Vec<String> = list
        .records
        .iter()
        .map(|r| {
            format!(
                "{}  {:<12}  queued {}  attempts {}/{}",
                r.id,
                r.payload.kind(),
                r.enqueued_at.format("%Y-%m-%d %H:%M"),
                r.attempts,
                max_attempts
            )
        })
        .collect();
    if let Some(at) = list.last_sync_attempt {
        lines.push(format!(
            "\nLast sync attempt: {}",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
