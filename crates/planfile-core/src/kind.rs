//! Document kind markers.
//!
//! The parser, updater, change computer, watcher, and write queue are
//! each written once, generic over a [`DocKind`]. A kind supplies the
//! status enum, the line grammar, and the couple of behavioral switches
//! that distinguish the task plan from the test plan.

use crate::models::{Status, TaskStatus, TestStepStatus};
use crate::parser::grammar::{LineGrammar, PLAN_GRAMMAR, TEST_PLAN_GRAMMAR};

/// Marker trait tying together everything kind-specific about one plan
/// file dialect.
pub trait DocKind: Send + Sync + 'static {
    /// The stored status enum for this kind.
    type Status: Status;

    /// Whether the watcher distinguishes file deletion from "file now
    /// unreadable". Only the test-plan variant does.
    const TRACKS_DELETION: bool;

    /// Short name used in log messages.
    const NAME: &'static str;

    /// The line grammar for this dialect.
    fn grammar() -> &'static LineGrammar;
}

/// The task plan dialect (PLAN.md).
#[derive(Debug, Clone, Copy)]
pub struct PlanKind;

impl DocKind for PlanKind {
    type Status = TaskStatus;
    const TRACKS_DELETION: bool = false;
    const NAME: &'static str = "plan";

    fn grammar() -> &'static LineGrammar {
        &PLAN_GRAMMAR
    }
}

/// The test plan dialect (TEST_PLAN.md).
#[derive(Debug, Clone, Copy)]
pub struct TestPlanKind;

impl DocKind for TestPlanKind {
    type Status = TestStepStatus;
    const TRACKS_DELETION: bool = true;
    const NAME: &'static str = "test-plan";

    fn grammar() -> &'static LineGrammar {
        &TEST_PLAN_GRAMMAR
    }
}
