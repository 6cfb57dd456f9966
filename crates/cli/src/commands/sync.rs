// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{plural, Context};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::{PassReport, Trigger};

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let report = run_impl(ctx).await?;
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => println!("{}", format_report(&report)),
    }
    Ok(())
}

/// One manual pass under the sync lock. The rate limit does not apply.
pub(crate) async fn run_impl(ctx: &Context) -> Result<PassReport> {
    let _lock = ctx.lock_sync()?;
    ctx.refresh_connectivity().await;
    Ok(ctx.coordinator().attempt_sync(Trigger::Manual).await)
}

pub(crate) fn format_report(report: &PassReport) -> String {
    match report {
        PassReport::Skipped { reason } => format!("Sync skipped: {}", reason),
        PassReport::Completed(summary) => {
            let mut text = format!(
                "Delivered {} form{}",
                summary.delivered,
                plural(summary.delivered)
            );
            if summary.retained > 0 {
                text.push_str(&format!(", {} still pending", summary.retained));
            }
            if summary.dropped > 0 {
                text.push_str(&format!(", {} dropped", summary.dropped));
            }
            text
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
