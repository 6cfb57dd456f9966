// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Form source for `report` and `survey`.
#[derive(Args, Clone, Debug, Default)]
pub struct FormArgs {
    /// JSON file holding the completed form (defaults to the saved draft)
    #[arg(long, short, value_name = "path")]
    pub file: Option<PathBuf>,

    #[arg(long, short = 'o', value_enum, default_value_t)]
    pub output: OutputFormat,
}
