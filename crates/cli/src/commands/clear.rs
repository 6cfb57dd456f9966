// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{plural, Context};
use crate::error::Result;

pub async fn run(ctx: &Context) -> Result<()> {
    let dropped = run_impl(ctx).await?;
    println!("Dropped {} pending form{}", dropped, plural(dropped));
    Ok(())
}

/// Drop every queued record. Drafts are kept.
pub(crate) async fn run_impl(ctx: &Context) -> Result<usize> {
    let dropped = ctx.queue.clear().await?;
    tracing::info!(dropped, "pending queue cleared");
    Ok(dropped)
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
