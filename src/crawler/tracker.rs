//! Completion tracking for one crawl cycle
//!
//! Every asynchronous unit of work in a cycle (source task, link fetch or
//! response processing) holds a [`WorkUnit`]. The unit is released when it
//! is dropped, so a task that returns early or panics still deregisters
//! exactly once. [`CompletionTracker::wait`] resolves when no
//! unit is outstanding.
//!
//! Units are only handed out by the tracker before waiting starts, or as
//! children of a live unit. A child is always registered before its parent
//! can be dropped, so the count cannot reach zero while work remains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

struct Inner {
    pending: AtomicUsize,
    idle: Notify,
}

impl Inner {
    fn release(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Counts outstanding units of work and wakes waiters when it reaches zero
#[derive(Clone)]
pub struct CompletionTracker {
    inner: Arc<Inner>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Registers a root unit of work
    pub fn register(&self) -> WorkUnit {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        WorkUnit {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of units registered and not yet released
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Waits until every registered unit has been released
    pub async fn wait(&self) {
        loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            // register interest before checking, so a release between the
            // check and the await is not missed
            idle.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            idle.await;
        }
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One registered unit of work, released on drop
#[must_use = "dropping a WorkUnit releases it immediately"]
pub struct WorkUnit {
    inner: Arc<Inner>,
}

impl WorkUnit {
    /// Registers a child unit that keeps the cycle open after this one ends
    pub fn register_child(&self) -> WorkUnit {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        WorkUnit {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        self.inner.release();
    }
}

impl std::fmt::Debug for WorkUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkUnit")
            .field("pending", &self.inner.pending.load(Ordering::Relaxed))
            .finish()
    }
}
