//! Change and conflict-resolution value types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Status;

/// A single typed difference between two parsed documents.
///
/// Produced by [`crate::changes::compute_changes`] and consumed by the
/// conflict-resolution UI and logging. Pure value type with no
/// persistent identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change<S: Status> {
    /// The stored status of a shared item differs
    StatusChanged {
        id: String,
        old: S,
        new: S,
        title: String,
    },
    /// An item id exists only in the newer document
    ItemAdded { id: String, status: S, title: String },
    /// An item id exists only in the older document
    ItemRemoved { id: String, status: S, title: String },
}

impl<S: Status> Change<S> {
    /// The id of the item this change concerns.
    pub fn item_id(&self) -> &str {
        match self {
            Change::StatusChanged { id, .. }
            | Change::ItemAdded { id, .. }
            | Change::ItemRemoved { id, .. } => id,
        }
    }
}

impl<S: Status> fmt::Display for Change<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::StatusChanged { id, old, new, title } => {
                write!(f, "{id} \"{title}\": {old} -> {new}")
            }
            Change::ItemAdded { id, status, title } => {
                write!(f, "{id} \"{title}\": added ({status})")
            }
            Change::ItemRemoved { id, status, title } => {
                write!(f, "{id} \"{title}\": removed (was {status})")
            }
        }
    }
}

/// The three outcomes a caller may choose after a conflict is
/// detected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    /// Adopt the externally observed document, discarding in-process
    /// edits represented by the current one
    Reload,
    /// Keep the current document untouched; the external edit is
    /// ignored until the next independent change event
    Keep,
    /// Defer; the next change event re-evaluates from scratch
    Later,
}
