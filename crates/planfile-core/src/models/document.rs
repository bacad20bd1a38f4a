//! Document model: the full parsed representation of one plan file.

use serde::{Deserialize, Serialize};

use super::{Item, Section, Status};

/// The ordered collection of sections parsed from one plan file, plus
/// document-level metadata.
///
/// One instance lives at a time per watched file, held by the file
/// watcher. It is fully replaced (not mutated) on every successful
/// parse, except that the write queue may rewrite a single item's
/// status and note in place after a confirmed write.
///
/// Invariant: item ids are unique within a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Document<S: Status> {
    /// Ordered sections; the order is the display order
    pub sections: Vec<Section<S>>,

    /// Free-text overview paragraph (task plan only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub overview: Option<String>,

    /// Success criteria bullet list (task plan only)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub success_criteria: Vec<String>,
}

impl<S: Status> Document<S> {
    /// Creates an empty document with no sections.
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            overview: None,
            success_criteria: Vec::new(),
        }
    }

    /// Flattened read-only view of all items across all sections, in
    /// section order then item order.
    pub fn items(&self) -> impl Iterator<Item = &Item<S>> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    /// Looks up an item by id.
    pub fn get(&self, id: &str) -> Option<&Item<S>> {
        self.items().find(|item| item.id == id)
    }

    /// Looks up an item by id for in-place mutation.
    ///
    /// Reserved for the write queue's post-write status update; all
    /// other document changes go through a full reparse.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Item<S>> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.items.iter_mut())
            .find(|item| item.id == id)
    }

    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// True when the document has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
