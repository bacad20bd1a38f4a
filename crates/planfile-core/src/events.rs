//! Typed event registration for the file watcher.
//!
//! The watcher exposes four events: reloaded, conflict detected,
//! deleted, and created. At most one handler is registered per event;
//! handlers are invoked synchronously from the watch and drain tasks
//! and must not block. Registering a handler replaces any previous
//! one.

use std::sync::Arc;

use crate::models::{Change, Document, Status};

/// Handler receiving the newly adopted document.
pub type ReloadedHandler<S> = Arc<dyn Fn(&Document<S>) + Send + Sync>;

/// Handler receiving the externally observed document and the change
/// set against the currently held one. The watcher has deliberately
/// not adopted the new document yet; the handler's owner resolves the
/// conflict later via
/// [`crate::watcher::FileWatcher::resolve_conflict`].
pub type ConflictHandler<S> = Arc<dyn Fn(&Document<S>, &[Change<S>]) + Send + Sync>;

/// Handler invoked when the watched file is deleted.
pub type DeletedHandler = Arc<dyn Fn() + Send + Sync>;

/// The registered handlers for one watched file.
///
/// Cloning is cheap (shared `Arc`s); the watcher snapshots the set
/// under its lock and dispatches after releasing it.
#[derive(Default, Clone)]
pub(crate) struct EventHandlers<S: Status> {
    pub reloaded: Option<ReloadedHandler<S>>,
    pub conflict: Option<ConflictHandler<S>>,
    pub deleted: Option<DeletedHandler>,
    pub created: Option<ReloadedHandler<S>>,
}

impl<S: Status> EventHandlers<S> {
    pub fn emit_reloaded(&self, document: &Document<S>) {
        if let Some(handler) = &self.reloaded {
            handler(document);
        }
    }

    pub fn emit_conflict(&self, document: &Document<S>, changes: &[Change<S>]) {
        if let Some(handler) = &self.conflict {
            handler(document, changes);
        }
    }

    pub fn emit_deleted(&self) {
        if let Some(handler) = &self.deleted {
            handler();
        }
    }

    /// Created falls back to the reloaded handler when no dedicated
    /// handler is registered.
    pub fn emit_created(&self, document: &Document<S>) {
        match (&self.created, &self.reloaded) {
            (Some(handler), _) => handler(document),
            (None, Some(handler)) => handler(document),
            (None, None) => {}
        }
    }
}
