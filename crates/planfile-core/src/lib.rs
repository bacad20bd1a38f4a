//! Core library for the Planfile plan-synchronization engine.
//!
//! Planfile keeps a markdown task plan (PLAN.md) and a markdown test
//! checklist (TEST_PLAN.md) consistent between two kinds of writers:
//! in-process status updates and out-of-process edits made by a human
//! or an agent in an editor. The crate provides, per watched file:
//!
//! - a pure [`parser`] from markdown text to a typed [`models::Document`]
//! - an incremental [`updater`] that rewrites exactly one item's status
//!   line and leaves every other byte untouched
//! - a [`changes`] computer that diffs two documents by item id
//! - a [`watcher::FileWatcher`] that classifies every filesystem event
//!   as self-write, deferred reload, silent reload, or conflict
//! - a [`write_queue::WriteQueue`] that serializes programmatic writes
//!   and reconciles external edits observed mid-write
//!
//! The task-plan and test-plan stacks are the same generic engines
//! instantiated with different [`kind::DocKind`]s.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use planfile_core::{FileWatcher, PlanKind, TaskStatus, WriteQueue};
//!
//! # async fn example() -> planfile_core::Result<()> {
//! let watcher: FileWatcher<PlanKind> = FileWatcher::new("PLAN.md");
//! watcher.on_reloaded(|doc| println!("reloaded: {} items", doc.item_count()));
//! watcher.on_conflict_detected(|_doc, changes| {
//!     for change in changes {
//!         println!("external edit: {change}");
//!     }
//! });
//!
//! let initial = watcher.force_reload().await?;
//! watcher.start_watching(Some(initial))?;
//!
//! let queue = WriteQueue::new(watcher.clone());
//! queue.enqueue("1.2", TaskStatus::Complete, None);
//! queue.wait_until_complete().await;
//! # Ok(())
//! # }
//! ```

pub mod changes;
pub mod error;
pub mod events;
pub mod kind;
pub mod models;
pub mod parser;
pub mod updater;
pub mod watcher;
pub mod write_queue;

// Re-export commonly used types
pub use changes::{compute_changes, compute_changes_opt};
pub use error::{Result, SyncError};
pub use events::{ConflictHandler, DeletedHandler, ReloadedHandler};
pub use kind::{DocKind, PlanKind, TestPlanKind};
pub use models::{
    Change, ConflictResolution, Document, Item, Section, Status, TaskStatus, TestStepStatus,
};
pub use parser::{parse, parse_path};
pub use updater::{update_status, update_status_in_file};
pub use watcher::FileWatcher;
pub use write_queue::WriteQueue;
