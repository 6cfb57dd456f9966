// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tm_core::FormKind;

pub use args::{FormArgs, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "trackmate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first delivery of TrackMate trail reports and surveys")]
#[command(
    long_about = "Offline-first delivery of TrackMate trail reports and surveys.\n\n\
    Forms are sent straight to the collection server when it is reachable and queued \
    on disk otherwise. Queued forms are delivered by 'trackmate sync' or 'trackmate run'."
)]
pub struct Cli {
    /// Config file (default: <data dir>/trackmate.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Directory holding the queue, drafts and logs
    #[arg(long = "data-dir", global = true, value_name = "path")]
    pub data_dir: Option<PathBuf>,

    /// Log more (repeat for trace output)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a trail issue report
    #[command(after_help = "\
Examples:
  trackmate report --file report.json   Submit a report from a file
  trackmate report                      Submit the saved report draft")]
    Report(FormArgs),

    /// Submit a trail survey response
    Survey(FormArgs),

    /// Manage saved form drafts
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// List forms waiting to be delivered
    Pending {
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Deliver queued forms now, ignoring the rate limit
    Sync {
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Keep delivering queued forms as connectivity changes, until Ctrl-C
    Run,

    /// Drop every queued form without delivering it
    Clear,

    /// Check whether the collection server is reachable
    Ping,
}

#[derive(Subcommand, Debug)]
pub enum DraftCommand {
    /// Save a draft from a JSON file, replacing any existing one
    Save {
        /// Form kind (report or survey)
        kind: FormKind,

        #[arg(long, short, value_name = "path")]
        file: PathBuf,
    },

    /// Print the saved draft
    Show {
        /// Form kind (report or survey)
        kind: FormKind,
    },

    /// Discard the saved draft
    Clear {
        /// Form kind (report or survey)
        kind: FormKind,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
