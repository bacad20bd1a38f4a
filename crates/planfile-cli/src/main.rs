//! Planfile CLI Application
//!
//! Command-line interface for the plan-file synchronization engine.

mod args;
mod cli;
mod renderer;

use anyhow::Result;
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use planfile_core::{PlanKind, TestPlanKind};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args { test_plan, no_color, command } = Args::parse();

    let cli = Cli::new(TerminalRenderer::new(!no_color));

    info!(
        "Planfile started ({} dialect)",
        if test_plan { "test-plan" } else { "task-plan" }
    );

    match command {
        Show { file, json } => {
            if test_plan {
                cli.show::<TestPlanKind>(&file, json).await
            } else {
                cli.show::<PlanKind>(&file, json).await
            }
        }
        Set { file, id, status, note } => {
            if test_plan {
                cli.set::<TestPlanKind>(&file, &id, &status, note.as_deref())
                    .await
            } else {
                cli.set::<PlanKind>(&file, &id, &status, note.as_deref())
                    .await
            }
        }
        Diff { old, new, json } => {
            if test_plan {
                cli.diff::<TestPlanKind>(&old, &new, json).await
            } else {
                cli.diff::<PlanKind>(&old, &new, json).await
            }
        }
        Watch { file } => {
            if test_plan {
                cli.watch::<TestPlanKind>(&file).await
            } else {
                cli.watch::<PlanKind>(&file).await
            }
        }
    }
}
