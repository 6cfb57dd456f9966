// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tm_core::FormKind;

use super::form::{form_payload, read_form};
use super::Context;
use crate::cli::{FormArgs, OutputFormat};
use crate::error::{Error, Result};
use crate::sync::{SubmitOutcome, Trigger};

pub async fn run(ctx: &Context, kind: FormKind, args: &FormArgs) -> Result<()> {
    let outcome = run_impl(ctx, kind, args).await?;
    let pending = ctx.queue.len().await;
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => {
            if let Some(text) = format_outcome(&outcome, pending) {
                println!("{}", text);
            }
        }
    }
    match outcome {
        SubmitOutcome::Rejected { errors } => Err(Error::Validation(errors)),
        SubmitOutcome::Accepted { .. } => Ok(()),
    }
}

/// Submit the form from `--file` or the saved draft.
pub(crate) async fn run_impl(
    ctx: &Context,
    kind: FormKind,
    args: &FormArgs,
) -> Result<SubmitOutcome> {
    let form = match &args.file {
        Some(path) => read_form(path)?,
        None => ctx.drafts.load(kind).await.ok_or(Error::NoDraft(kind))?,
    };
    let payload = form_payload(kind, form, ctx.clock.now())?;

    ctx.refresh_connectivity().await;
    let outcome = ctx.facade().submit(payload).await;
    if let SubmitOutcome::Accepted {
        delivered_immediately: false,
        ..
    } = outcome
    {
        sync_after_enqueue(ctx).await;
    }
    Ok(outcome)
}

/// Attempt a pass for the newly queued form. Skipped while another process
/// holds the sync lock; that process drains the queue instead.
async fn sync_after_enqueue(ctx: &Context) {
    let _lock = match ctx.lock_sync() {
        Ok(lock) => lock,
        Err(e) => {
            tracing::info!(error = %e, "not syncing after enqueue");
            return;
        }
    };
    let report = ctx.coordinator().attempt_sync(Trigger::Enqueue).await;
    tracing::debug!(?report, "sync after enqueue");
}

/// Text shown for an outcome; rejections are reported through the error.
pub(crate) fn format_outcome(outcome: &SubmitOutcome, pending: usize) -> Option<String> {
    match outcome {
        SubmitOutcome::Accepted {
            id,
            delivered_immediately: true,
        } => Some(format!("Sent {}", id)),
        SubmitOutcome::Accepted {
            id,
            delivered_immediately: false,
        } => Some(format!(
            "Saved offline as {} ({} form{} pending)\n  run 'trackmate sync' once the server is reachable",
            id,
            pending,
            super::plural(pending)
        )),
        SubmitOutcome::Rejected { .. } => None,
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
