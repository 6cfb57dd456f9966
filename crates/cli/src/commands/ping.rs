// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::{Error, Result};

pub async fn run(ctx: &Context) -> Result<()> {
    run_impl(ctx).await?;
    println!("{} is reachable", ctx.config.endpoint);
    Ok(())
}

pub(crate) async fn run_impl(ctx: &Context) -> Result<()> {
    if ctx.refresh_connectivity().await {
        Ok(())
    } else {
        Err(Error::Unreachable(ctx.config.endpoint.clone()))
    }
}

#[cfg(test)]
#[path = "ping_tests.rs"]
mod tests;
