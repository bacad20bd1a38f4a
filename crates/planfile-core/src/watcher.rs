//! File watcher: observes one plan file for external edits and
//! classifies every change.
//!
//! Each qualifying filesystem notification is classified as exactly one
//! of: self-write (suppressed via mtime matching), deferred reload (a
//! programmatic write is in flight), creation, silent reload (change
//! set is empty), or genuine conflict. On conflict the held document is
//! deliberately *not* replaced; the registered conflict handler
//! receives the externally observed document and the change list, and
//! the owner resolves it later via [`FileWatcher::resolve_conflict`].
//!
//! There is at most one watch task per watched file. The task and the
//! write queue's drain task share state through a single mutex with
//! short critical sections; callbacks are always invoked after the
//! lock is released.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use log::{debug, error, warn};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;

use crate::changes::{compute_changes, compute_changes_opt};
use crate::error::{Result, SyncError};
use crate::events::{ConflictHandler, DeletedHandler, EventHandlers, ReloadedHandler};
use crate::kind::DocKind;
use crate::models::{Change, ConflictResolution, Document, Status};
use crate::parser;

/// Window for collapsing rapid successive notifications from the same
/// save operation.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

/// How often the watch loop wakes up to honor a stop request when no
/// notifications arrive.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Watches one plan file and holds its currently adopted document.
///
/// Cheap to clone; all clones share the same state. The paired
/// [`crate::write_queue::WriteQueue`] holds such a clone and
/// coordinates with the watcher through the `has_pending_writes` flag
/// and the single-slot queued reload buffer, so writes in flight are
/// never mistaken for external edits.
pub struct FileWatcher<K: DocKind> {
    shared: Arc<Shared<K>>,
}

impl<K: DocKind> Clone for FileWatcher<K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<K: DocKind> {
    path: PathBuf,
    inner: Mutex<Inner<K>>,
}

struct Inner<K: DocKind> {
    document: Option<Document<K::Status>>,
    watching: bool,
    has_pending_writes: bool,
    /// Most recent externally observed document that arrived while a
    /// write was in flight. Overwritten, never accumulated.
    queued_reload: Option<Document<K::Status>>,
    /// Mtime of the last write this process made (or the last event it
    /// processed); used to suppress notifications for our own writes.
    last_mtime: Option<SystemTime>,
    /// Bumped on every `start_watching`. A watch task only touches the
    /// `watching` flag while its own generation is current, so a stale
    /// task from a previous start cannot stop a restarted watch.
    generation: u64,
    handlers: EventHandlers<K::Status>,
    /// Kept alive for the duration of the watch; dropping it closes
    /// the notification channel.
    fs_watcher: Option<RecommendedWatcher>,
}

impl<K: DocKind> Shared<K> {
    fn lock(&self) -> MutexGuard<'_, Inner<K>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Classification of one parsed external change, decided under the
/// state lock and emitted after it is released.
enum Outcome<S: Status> {
    Deferred,
    Created(Document<S>),
    Reloaded(Document<S>),
    Conflict(Document<S>, Vec<Change<S>>),
}

impl<K: DocKind> FileWatcher<K> {
    /// Creates a watcher for the given plan file. No filesystem
    /// subscription exists until [`FileWatcher::start_watching`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            shared: Arc::new(Shared {
                path: path.into(),
                inner: Mutex::new(Inner {
                    document: None,
                    watching: false,
                    has_pending_writes: false,
                    queued_reload: None,
                    last_mtime: None,
                    generation: 0,
                    handlers: EventHandlers::default(),
                    fs_watcher: None,
                }),
            }),
        }
    }

    /// The watched file path.
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Snapshot of the currently adopted document, if any.
    pub fn document(&self) -> Option<Document<K::Status>> {
        self.shared.lock().document.clone()
    }

    /// True while the background watch task is running.
    pub fn is_watching(&self) -> bool {
        self.shared.lock().watching
    }

    /// Registers the handler invoked when a document is adopted
    /// without a conflict. Replaces any previous handler.
    pub fn on_reloaded(&self, handler: impl Fn(&Document<K::Status>) + Send + Sync + 'static) {
        self.shared.lock().handlers.reloaded = Some(Arc::new(handler) as ReloadedHandler<_>);
    }

    /// Registers the handler invoked when an external edit conflicts
    /// with the held document. Replaces any previous handler.
    pub fn on_conflict_detected(
        &self,
        handler: impl Fn(&Document<K::Status>, &[Change<K::Status>]) + Send + Sync + 'static,
    ) {
        self.shared.lock().handlers.conflict = Some(Arc::new(handler) as ConflictHandler<_>);
    }

    /// Registers the handler invoked when the watched file is deleted.
    /// Only fires for kinds that track deletion. Replaces any previous
    /// handler.
    pub fn on_deleted(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.shared.lock().handlers.deleted = Some(Arc::new(handler) as DeletedHandler);
    }

    /// Registers the handler invoked when the file is first observed
    /// (or reappears after deletion). Falls back to the reloaded
    /// handler when unset. Replaces any previous handler.
    pub fn on_created(&self, handler: impl Fn(&Document<K::Status>) + Send + Sync + 'static) {
        self.shared.lock().handlers.created = Some(Arc::new(handler) as ReloadedHandler<_>);
    }

    /// Starts watching the file's parent directory for changes to the
    /// file, optionally seeding the held document.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Watch`] when a watch is already running or
    /// the filesystem subscription cannot be established.
    pub fn start_watching(&self, initial: Option<Document<K::Status>>) -> Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watched = self.shared.path.clone();

        let mut fs_watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let relevant = matches!(
                        event.kind,
                        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                    );
                    if relevant && event.paths.iter().any(|p| p == &watched) {
                        let _ = tx.send(event);
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_millis(200)),
        )
        .map_err(|e| SyncError::watch(&self.shared.path, e.to_string()))?;

        // Watch the parent directory so file creation and atomic
        // editor saves (write-to-temp, rename) are observed.
        let parent = self
            .shared
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        fs_watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .map_err(|e| SyncError::watch(&self.shared.path, e.to_string()))?;

        let generation = {
            let mut inner = self.shared.lock();
            if inner.watching {
                return Err(SyncError::watch(&self.shared.path, "already watching"));
            }
            if initial.is_some() {
                inner.document = initial;
            }
            inner.watching = true;
            inner.generation += 1;
            inner.fs_watcher = Some(fs_watcher);
            inner.generation
        };

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { watch_loop::<K>(shared, rx, generation).await });
        Ok(())
    }

    /// Stops the background watch task. The held document and
    /// registered handlers are retained.
    pub fn stop_watching(&self) {
        let _fs_watcher = {
            let mut inner = self.shared.lock();
            inner.watching = false;
            inner.fs_watcher.take()
        };
        // Dropping the notify watcher closes the event channel; the
        // loop exits on the closed channel or the next poll tick.
    }

    /// Explicit manual reload: reparses the file and adopts the result
    /// unconditionally, surfacing read errors to the caller (unlike
    /// the watch loop, which skips unreadable intermediate states).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::FileSystem`] when the file cannot be read.
    pub async fn force_reload(&self) -> Result<Document<K::Status>> {
        let path = &self.shared.path;
        let mtime = file_mtime(path).await?;
        let document = parser::parse_path::<K>(path).await?;

        let handlers = {
            let mut inner = self.shared.lock();
            inner.last_mtime = Some(mtime);
            inner.queued_reload = None;
            inner.document = Some(document.clone());
            inner.handlers.clone()
        };
        handlers.emit_reloaded(&document);
        Ok(document)
    }

    /// Applies the caller's decision for a previously reported
    /// conflict.
    pub fn resolve_conflict(
        &self,
        document: Document<K::Status>,
        resolution: ConflictResolution,
    ) {
        match resolution {
            ConflictResolution::Reload => {
                let handlers = {
                    let mut inner = self.shared.lock();
                    inner.document = Some(document.clone());
                    inner.handlers.clone()
                };
                handlers.emit_reloaded(&document);
            }
            // Keep: the external edit is discarded with `document`;
            // the held document stays authoritative.
            ConflictResolution::Keep => {}
            // Later: no state change; the next change event
            // re-evaluates from scratch.
            ConflictResolution::Later => {}
        }
    }

    /// Marks whether a programmatic write is in flight. While set,
    /// external change events are stashed in the queued-reload slot
    /// instead of being classified.
    pub(crate) fn set_pending_writes(&self, pending: bool) {
        self.shared.lock().has_pending_writes = pending;
    }

    /// Records the mtime of a write this process just made, so the
    /// watcher's own notification for it is suppressed.
    pub(crate) fn record_write_mtime(&self, mtime: SystemTime) {
        self.shared.lock().last_mtime = Some(mtime);
    }

    /// Mutates one item of the held document in place after a
    /// confirmed write, avoiding a full reparse for the common case.
    pub(crate) fn apply_local_update(&self, id: &str, status: K::Status, note: Option<&str>) {
        let mut inner = self.shared.lock();
        if let Some(document) = &mut inner.document {
            if let Some(item) = document.get_mut(id) {
                item.status = status;
                item.note = if status.carries_note() {
                    note.map(String::from)
                } else {
                    None
                };
            }
        }
    }

    /// Reconciles the queued reload captured while writes were in
    /// flight: silent reload when nothing diverged, conflict
    /// otherwise. Clears the slot either way. Called by the write
    /// queue once its drain completes.
    pub(crate) fn process_queued_reload(&self) {
        let (handlers, outcome) = {
            let mut inner = self.shared.lock();
            let Some(queued) = inner.queued_reload.take() else {
                return;
            };
            let handlers = inner.handlers.clone();
            let changes = compute_changes_opt(inner.document.as_ref(), &queued);
            if changes.is_empty() {
                inner.document = Some(queued.clone());
                (handlers, Outcome::Reloaded(queued))
            } else {
                (handlers, Outcome::Conflict(queued, changes))
            }
        };
        emit(&handlers, outcome);
    }

    #[cfg(test)]
    fn set_last_mtime(&self, mtime: SystemTime) {
        self.shared.lock().last_mtime = Some(mtime);
    }

    #[cfg(test)]
    fn queued_reload(&self) -> Option<Document<K::Status>> {
        self.shared.lock().queued_reload.clone()
    }
}

/// Background loop: awaits notifications, debounces, and hands each
/// settled change to the classifier. Any unexpected error is fatal for
/// this watcher instance: the `watching` flag is cleared and the task
/// ends without auto-restart.
///
/// `generation` identifies the `start_watching` call that spawned this
/// task; once a newer start supersedes it, the task exits without
/// touching shared state.
async fn watch_loop<K: DocKind>(
    shared: Arc<Shared<K>>,
    mut rx: mpsc::UnboundedReceiver<Event>,
    generation: u64,
) {
    debug!(
        "watch loop started for {} file {}",
        K::NAME,
        shared.path.display()
    );

    loop {
        match tokio::time::timeout(STOP_POLL_INTERVAL, rx.recv()).await {
            // No notification this tick; honor a stop request.
            Err(_) => {
                let inner = shared.lock();
                if !inner.watching || inner.generation != generation {
                    break;
                }
            }
            // Channel closed (watcher dropped by stop_watching).
            Ok(None) => {
                let mut inner = shared.lock();
                if inner.generation == generation {
                    inner.watching = false;
                }
                break;
            }
            Ok(Some(_event)) => {
                {
                    let inner = shared.lock();
                    if !inner.watching || inner.generation != generation {
                        break;
                    }
                }
                // Let the save settle, then collapse the burst of
                // notifications it produced into one processing pass.
                tokio::time::sleep(DEBOUNCE_WINDOW).await;
                while rx.try_recv().is_ok() {}

                if let Err(e) = handle_change::<K>(&shared).await {
                    error!(
                        "watch loop for {} ended unexpectedly: {e}",
                        shared.path.display()
                    );
                    let mut inner = shared.lock();
                    if inner.generation == generation {
                        inner.watching = false;
                    }
                    break;
                }
            }
        }
    }

    debug!("watch loop stopped for {}", shared.path.display());
}

/// Processes one settled change notification for the watched path.
///
/// Recoverable conditions (file temporarily unavailable, unreadable
/// intermediate save) are logged and ignored here; an `Err` return is
/// reserved for unexpected failures and kills the watch loop.
async fn handle_change<K: DocKind>(shared: &Arc<Shared<K>>) -> Result<()> {
    let path = &shared.path;

    let mtime = match file_mtime(path).await {
        Ok(mtime) => mtime,
        Err(SyncError::FileSystem { ref source, .. })
            if source.kind() == std::io::ErrorKind::NotFound && K::TRACKS_DELETION =>
        {
            handle_deleted::<K>(shared);
            return Ok(());
        }
        Err(e) => {
            debug!("{} file {} unavailable: {e}", K::NAME, path.display());
            return Ok(());
        }
    };

    {
        let mut inner = shared.lock();
        // Same mtime as our own last write (or an already-processed
        // event): suppress. The new mtime is recorded before parsing
        // so a slow parse cannot reprocess the same change.
        if inner.last_mtime == Some(mtime) {
            return Ok(());
        }
        inner.last_mtime = Some(mtime);
    }

    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "skipping change event for {}: unreadable content: {e}",
                path.display()
            );
            return Ok(());
        }
    };

    let new_document = parser::parse::<K>(&text);
    classify_parsed::<K>(shared, new_document);
    Ok(())
}

/// Classifies a freshly parsed external document under the state lock
/// and emits the resulting event after releasing it.
fn classify_parsed<K: DocKind>(shared: &Arc<Shared<K>>, new_document: Document<K::Status>) {
    let (handlers, outcome) = {
        let mut inner = shared.lock();
        let handlers = inner.handlers.clone();

        if inner.has_pending_writes {
            // Defer conflict evaluation until the write drains; only
            // the latest externally observed version is kept.
            inner.queued_reload = Some(new_document);
            (handlers, Outcome::Deferred)
        } else if let Some(current) = &inner.document {
            let changes = compute_changes(current, &new_document);
            if changes.is_empty() {
                inner.document = Some(new_document.clone());
                (handlers, Outcome::Reloaded(new_document))
            } else {
                // Genuine conflict: do not adopt; resolution is the
                // caller's decision.
                (handlers, Outcome::Conflict(new_document, changes))
            }
        } else {
            // First observation, or reappearance after deletion.
            inner.document = Some(new_document.clone());
            (handlers, Outcome::Created(new_document))
        }
    };
    emit(&handlers, outcome);
}

fn handle_deleted<K: DocKind>(shared: &Arc<Shared<K>>) {
    let handlers = {
        let mut inner = shared.lock();
        if inner.document.is_none() {
            return;
        }
        inner.document = None;
        inner.last_mtime = None;
        inner.handlers.clone()
    };
    debug!("{} file {} deleted", K::NAME, shared.path.display());
    handlers.emit_deleted();
}

fn emit<S: Status>(handlers: &EventHandlers<S>, outcome: Outcome<S>) {
    match outcome {
        Outcome::Deferred => {}
        Outcome::Created(document) => handlers.emit_created(&document),
        Outcome::Reloaded(document) => handlers.emit_reloaded(&document),
        Outcome::Conflict(document, changes) => handlers.emit_conflict(&document, &changes),
    }
}

async fn file_mtime(path: &Path) -> Result<SystemTime> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| SyncError::file_system(path, e))?;
    metadata
        .modified()
        .map_err(|e| SyncError::file_system(path, e))
}
