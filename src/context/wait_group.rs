//! # Supervised-work counter.
//!
//! [`WaitGroup`] counts outstanding units of work a context supervises. It is a
//! thin wrapper over [`tokio_util::task::TaskTracker`]:
//!
//! ```text
//! add()    ──► WorkUnit (RAII)      drop(WorkUnit) ──► count - 1
//! spawn(f) ──► tracked JoinHandle   task finishes  ──► count - 1
//! wait()   ──► close() + wait until count == 0
//! ```
//!
//! ## Rules
//! - A unit is released exactly once: when its [`WorkUnit`] is dropped or its
//!   spawned task completes. There is no separate `done()` call to forget.
//! - [`WaitGroup::wait`] closes the group first; units registered afterwards
//!   are still counted and still awaited.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::task::{TaskTracker, task_tracker::TaskTrackerToken};

/// Counter of outstanding supervised work. Cheap to clone (shared state).
#[derive(Clone, Debug, Default)]
pub struct WaitGroup {
    tracker: TaskTracker,
}

/// One registered unit of supervised work; deregisters on drop.
#[must_use = "the work unit is released as soon as it is dropped"]
#[derive(Debug)]
pub struct WorkUnit {
    _token: TaskTrackerToken,
}

impl WaitGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of work.
    pub fn add(&self) -> WorkUnit {
        WorkUnit {
            _token: self.tracker.token(),
        }
    }

    /// Spawns a tokio task counted as one unit for as long as it runs.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(fut)
    }

    /// Number of outstanding units.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    /// Returns true if no unit is outstanding.
    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Waits until every outstanding unit has been released.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
