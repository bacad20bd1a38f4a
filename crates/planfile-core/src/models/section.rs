//! Section model definition.

use serde::{Deserialize, Serialize};

use super::{Item, Status};

/// A named, ordered group of items (a "Phase" for the task plan, a
/// named checklist section for the test plan).
///
/// Sections are immutable in structure after parsing: items are never
/// reordered, and the whole section is replaced wholesale on reparse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section<S: Status> {
    /// Unique identifier, e.g. `"2"` or `"section-0"`
    pub id: String,

    /// Section title as written in the heading
    pub title: String,

    /// Ordered items; the order is the display order
    pub items: Vec<Item<S>>,
}

impl<S: Status> Section<S> {
    /// Creates an empty section with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            items: Vec::new(),
        }
    }
}
