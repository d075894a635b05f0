//! Frontier queue of (url, depth) work items
//!
//! The frontier is a FIFO shared by every worker. Besides the queue itself it
//! keeps a pending count: items pushed but not yet fully processed. A popped
//! item is handed out as an [`InFlight`] guard and stays pending until the
//! guard drops, so a worker's newly discovered links are always pushed while
//! its own item still counts. The frontier is drained exactly when the pending
//! count reaches zero; at that point no queued item remains and no in-flight
//! item can produce more.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// A URL waiting to be crawled, with its link-hop depth (seed = 1)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    pub url: String,
    pub depth: u32,
}

impl WorkItem {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (depth {})", self.url, self.depth)
    }
}

/// Concurrency-safe work queue with drain detection
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<WorkItem>>,
    pending: AtomicUsize,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an item; never blocks
    pub fn push(&self, item: WorkItem) {
        // Count first so the item is pending before any worker can see it
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.lock().push_back(item);
        self.notify.notify_one();
    }

    /// Waits up to `timeout` for an item
    ///
    /// Returns `None` when the timeout elapses with nothing to hand out, or
    /// immediately once the frontier is drained. Callers tell the two apart
    /// with [`Frontier::is_drained`].
    pub async fn pop_with_timeout(&self, timeout: Duration) -> Option<InFlight<'_>> {
        let deadline = Instant::now() + timeout;

        loop {
            // Register interest before looking, so a push or the final
            // completion between the check and the wait is not missed
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let next = self.lock().pop_front();
            if let Some(item) = next {
                return Some(InFlight {
                    frontier: self,
                    item,
                });
            }

            if self.is_drained() {
                return None;
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return None;
            }
        }
    }

    /// True when nothing is queued and nothing is in flight
    pub fn is_drained(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }

    /// Items queued or in flight
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn complete(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Last item done: wake every idle worker so they can stop
            self.notify.notify_waiters();
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<WorkItem>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A dequeued item that still counts as pending until dropped
///
/// Dropping the guard (including during a panic unwind) marks the item as
/// fully processed.
#[derive(Debug)]
pub struct InFlight<'a> {
    frontier: &'a Frontier,
    item: WorkItem,
}

impl InFlight<'_> {
    pub fn item(&self) -> &WorkItem {
        &self.item
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}
