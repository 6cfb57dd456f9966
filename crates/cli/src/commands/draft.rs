// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use serde_json::Value;
use tm_core::FormKind;

use super::form::read_form;
use super::Context;
use crate::cli::DraftCommand;
use crate::error::{Error, Result};

pub async fn run(ctx: &Context, command: &DraftCommand) -> Result<()> {
    match command {
        DraftCommand::Save { kind, file } => {
            save(ctx, *kind, file).await?;
            println!("Saved {} draft", kind);
        }
        DraftCommand::Show { kind } => {
            let draft = show(ctx, *kind).await?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        DraftCommand::Clear { kind } => {
            ctx.drafts.clear(*kind).await?;
            println!("Cleared {} draft", kind);
        }
    }
    Ok(())
}

/// Replace the `kind` draft with the JSON object in `file`.
///
/// Drafts are partial, so they are not validated.
pub(crate) async fn save(ctx: &Context, kind: FormKind, file: &Path) -> Result<()> {
    let draft = read_form(file)?;
    ctx.drafts.save(kind, &draft).await?;
    tracing::debug!(%kind, "draft saved");
    Ok(())
}

pub(crate) async fn show(ctx: &Context, kind: FormKind) -> Result<Value> {
    ctx.drafts.load(kind).await.ok_or(Error::NoDraft(kind))
}

#[cfg(test)]
#[path = "draft_tests.rs"]
mod tests;
