//! Write queue: serializes programmatic status updates against one
//! plan file.
//!
//! All updates go through an unbounded FIFO drained by at most one
//! background task. The drain coordinates with the paired
//! [`FileWatcher`] so that writes in flight are never mistaken for
//! external edits: the pending-writes flag is raised for the duration
//! of the drain, each written file's mtime is recorded for self-write
//! suppression, and any external change observed meanwhile is
//! reconciled once the drain completes.
//!
//! No failure inside the queue propagates to callers: a request whose
//! item is missing from the file, or whose write fails, is logged and
//! abandoned while the drain moves on to the next request. Nothing is
//! ever retried.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::kind::DocKind;
use crate::updater;
use crate::watcher::FileWatcher;

/// One queued status update.
#[derive(Debug, Clone)]
struct WriteRequest<S> {
    item_id: String,
    status: S,
    note: Option<String>,
}

struct QueueState<S> {
    pending: VecDeque<WriteRequest<S>>,
    draining: bool,
    drain_task: Option<JoinHandle<()>>,
}

/// Serializes status writes against the file owned by a
/// [`FileWatcher`].
///
/// Cheap to clone; all clones share the same queue.
pub struct WriteQueue<K: DocKind> {
    watcher: FileWatcher<K>,
    state: Arc<Mutex<QueueState<K::Status>>>,
}

impl<K: DocKind> Clone for WriteQueue<K> {
    fn clone(&self) -> Self {
        Self {
            watcher: self.watcher.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<K: DocKind> WriteQueue<K> {
    /// Creates a queue bound to the watcher's file.
    pub fn new(watcher: FileWatcher<K>) -> Self {
        Self {
            watcher,
            state: Arc::new(Mutex::new(QueueState {
                pending: VecDeque::new(),
                draining: false,
                drain_task: None,
            })),
        }
    }

    /// Appends a status update and returns immediately.
    ///
    /// Starts the drain task iff one is not already running. The
    /// draining flag and the watcher's pending-writes flag are both
    /// set synchronously here, before the drain task's first await, so
    /// two back-to-back enqueues cannot start two drains and the
    /// watcher defers external events from this point on.
    pub fn enqueue(&self, item_id: impl Into<String>, status: K::Status, note: Option<String>) {
        let request = WriteRequest {
            item_id: item_id.into(),
            status,
            note,
        };

        let mut state = self.lock();
        state.pending.push_back(request);
        if !state.draining {
            state.draining = true;
            self.watcher.set_pending_writes(true);
            let queue = self.clone();
            state.drain_task = Some(tokio::spawn(async move { queue.drain().await }));
        }
    }

    /// Number of not-yet-applied requests.
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// True while a drain task is running.
    pub fn is_processing(&self) -> bool {
        self.lock().draining
    }

    /// Waits until every queued request has been applied (or
    /// abandoned) and the drain has settled.
    pub async fn wait_until_complete(&self) {
        loop {
            let handle = {
                let mut state = self.lock();
                state.drain_task.take()
            };
            match handle {
                Some(handle) => {
                    if let Err(e) = handle.await {
                        if !e.is_cancelled() {
                            warn!("drain task for {} failed: {e}", self.watcher.path().display());
                        }
                    }
                }
                None => {
                    if !self.lock().draining {
                        return;
                    }
                    // Another waiter holds the handle; poll briefly.
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    /// Discards all not-yet-applied requests and cancels an in-flight
    /// drain without awaiting it.
    ///
    /// This is a hard reset: writes already applied are not rolled
    /// back, and the watcher's pending-writes flag is cleared
    /// unconditionally.
    pub fn cancel(&self) {
        let handle = {
            let mut state = self.lock();
            state.pending.clear();
            state.draining = false;
            state.drain_task.take()
        };
        if let Some(handle) = handle {
            handle.abort();
        }
        self.watcher.set_pending_writes(false);
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<K::Status>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drains the queue one request at a time, then reconciles any
    /// external change stashed by the watcher during the drain.
    async fn drain(self) {
        loop {
            loop {
                let request = self.lock().pending.pop_front();
                let Some(request) = request else { break };
                if let Err(e) = self.apply_one(&request).await {
                    // Log and move on; nothing is retried.
                    warn!(
                        "abandoning status write for '{}' in {}: {e}",
                        request.item_id,
                        self.watcher.path().display()
                    );
                }
            }

            self.watcher.process_queued_reload();

            let mut state = self.lock();
            if state.pending.is_empty() {
                state.draining = false;
                state.drain_task = None;
                // Cleared under the queue lock so a concurrent enqueue
                // cannot interleave between the two flag updates.
                self.watcher.set_pending_writes(false);
                drop(state);
                debug!("write queue drained for {}", self.watcher.path().display());
                return;
            }
            // A request arrived while settling; keep draining.
        }
    }

    /// Applies a single request: read, patch, write, record the new
    /// mtime for self-write suppression, and update the held document
    /// in place.
    async fn apply_one(&self, request: &WriteRequest<K::Status>) -> crate::error::Result<()> {
        let path = self.watcher.path();

        updater::update_status_in_file::<K>(
            path,
            &request.item_id,
            request.status,
            request.note.as_deref(),
        )
        .await?;

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| crate::error::SyncError::file_system(path, e))?;
        let mtime = metadata
            .modified()
            .map_err(|e| crate::error::SyncError::file_system(path, e))?;
        self.watcher.record_write_mtime(mtime);

        self.watcher
            .apply_local_update(&request.item_id, request.status, request.note.as_deref());
        Ok(())
    }
}
