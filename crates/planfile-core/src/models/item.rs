//! Item model definition and related functionality.

use serde::{Deserialize, Serialize};

use super::Status;

/// A single task or test step within a section.
///
/// Items are created fresh on every parse; no identity persists across
/// parses except id equality. The write queue may mutate `status` and
/// `note` in place on the currently held document as an optimization,
/// everything else is immutable after parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item<S: Status> {
    /// Hierarchical identifier, e.g. `"2.1"` or `"section-0-3"`
    pub id: String,

    /// Display title (task) or description (test step)
    pub title: String,

    /// Current stored status, as parsed from the file
    pub status: S,

    /// Attached note text (test-step variant, failed state only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,

    /// Reference to the specification entry this item covers
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub spec: Option<String>,

    /// Scope description for the item
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scope: Option<String>,

    /// Acceptance criteria for the item
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub acceptance: Option<String>,

    /// Terminal session associated with the item
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session: Option<String>,

    /// Ids of items this item depends on (task variant only)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub depends: Vec<String>,

    /// Derived display overlay: true when a dependency is not yet
    /// complete or skipped. Computed after parsing, never stored in
    /// the file and never part of change detection.
    #[serde(skip)]
    pub blocked: bool,
}

impl<S: Status> Item<S> {
    /// Creates a new item with the given id, title, and status.
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: S) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
            note: None,
            spec: None,
            scope: None,
            acceptance: None,
            session: None,
            depends: Vec::new(),
            blocked: false,
        }
    }
}
