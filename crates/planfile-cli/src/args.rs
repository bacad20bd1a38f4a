use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Main command-line interface for the Planfile plan-file tool
///
/// Planfile keeps markdown task plans (PLAN.md) and test checklists
/// (TEST_PLAN.md) in sync between in-process status updates and
/// external editors. The CLI exposes the same engine for one-shot use:
/// inspecting a parsed plan, patching an item's status in place,
/// diffing two versions, and tailing change/conflict events live.
#[derive(Parser)]
#[command(version, about, name = "pf")]
pub struct Args {
    /// Parse files with the test-plan dialect (checkbox-encoded
    /// statuses, Note lines) instead of the task-plan dialect
    #[arg(long, global = true)]
    pub test_plan: bool,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Planfile CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a plan file and render it
    #[command(alias = "s")]
    Show {
        /// Plan file to parse
        file: PathBuf,

        /// Emit the parsed document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite one item's status in place, leaving the rest of the
    /// file byte-identical
    Set {
        /// Plan file to patch
        file: PathBuf,

        /// Item id, e.g. "2.1" or "section-0-3"
        id: String,

        /// New status token, e.g. "complete" or "failed"
        status: String,

        /// Note to attach (test-plan dialect, failed steps only)
        #[arg(long)]
        note: Option<String>,
    },
    /// Compute the change set between two versions of a plan
    Diff {
        /// Older version of the file
        old: PathBuf,

        /// Newer version of the file
        new: PathBuf,

        /// Emit the change set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch a plan file and print reload/conflict/delete events until
    /// interrupted
    Watch {
        /// Plan file to watch
        file: PathBuf,
    },
}
