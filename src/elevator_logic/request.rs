//! Pending destination floors of one elevator.
//!
//! The [RequestQueue] is a deduplicated set of floors, safe to share between the
//! elevator's operating task and any number of producers. Retrieval order is not
//! insertion order: the sweep in [super::fsm] decides which floor is served next,
//! so the queue only answers set questions (is a floor pending, is anything above
//! or below a given floor).
//!
//! A successful [RequestQueue::add] wakes every task currently waiting on
//! [RequestQueue::notified].

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::futures::Notified;
use tokio::sync::Notify;

/// Thread-safe, deduplicated set of pending floors.
#[derive(Debug, Default)]
pub struct RequestQueue {
    pending: Mutex<BTreeSet<u32>>,
    added: Notify,
}

impl RequestQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<u32>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Inserts `floor`. Returns `false` (and wakes nobody) if it was already queued.
    pub fn add(&self, floor: u32) -> bool {
        let inserted = self.lock().insert(floor);
        if inserted {
            self.added.notify_waiters();
        }
        inserted
    }

    /// Removes `floor` if present. Returns whether it was there.
    pub fn remove(&self, floor: u32) -> bool {
        self.lock().remove(&floor)
    }

    #[allow(missing_docs)]
    pub fn contains(&self, floor: u32) -> bool {
        self.lock().contains(&floor)
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Any floor strictly above `floor` pending?
    pub fn any_above(&self, floor: u32) -> bool {
        self.lock().range(floor.saturating_add(1)..).next().is_some()
    }

    /// Any floor strictly below `floor` pending?
    pub fn any_below(&self, floor: u32) -> bool {
        self.lock().range(..floor).next().is_some()
    }

    /// Pending floors in ascending order.
    pub fn snapshot(&self) -> Vec<u32> {
        self.lock().iter().copied().collect()
    }

    /// Future completing on the next successful [RequestQueue::add].
    ///
    /// Call `enable()` on the pinned future before re-checking the queue,
    /// otherwise an add between the check and the first poll is missed.
    pub fn notified(&self) -> Notified<'_> {
        self.added.notified()
    }
}
