//! Data models for plan and test-plan documents.
//!
//! This module contains the core domain models shared by both document
//! kinds: a [`Document`] is an ordered list of [`Section`]s, each an
//! ordered list of [`Item`]s, with the status type supplied by the
//! kind-specific [`Status`] implementation ([`TaskStatus`] for the
//! task plan, [`TestStepStatus`] for the test plan).
//!
//! All model types are plain values: they are rebuilt wholesale on
//! every parse and carry no handles back into the watcher or queue.

pub mod change;
pub mod document;
pub mod item;
pub mod section;
pub mod status;

#[cfg(test)]
mod tests;

pub use change::{Change, ConflictResolution};
pub use document::Document;
pub use item::Item;
pub use section::Section;
pub use status::{Status, TaskStatus, TestStepStatus};
