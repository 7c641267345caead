//! Work queue: unbounded FIFO shared by the producer and the upload workers, with drain detection.
//!
//! Every successful [`WorkQueue::pop`] hands out a [`Claim`]. The claim marks the item done when it
//! is completed or dropped, so a worker that fails (or panics) part way through a task still
//! releases it. The claim is the only way to acknowledge an item; an acknowledgement with nothing
//! in flight is a protocol violation and panics.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct QueueState<T> {
    pending: VecDeque<T>,
    in_flight: usize,
    closed: bool,
}

impl<T> QueueState<T> {
    fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }
}

pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    /// Signalled on push and on close.
    available: Condvar,
    /// Signalled whenever the queue becomes drained.
    drained: Condvar,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                in_flight: 0,
                closed: false,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    // State is never left half-updated (no panics while locked), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append to the tail. Never blocks.
    ///
    /// # Panics
    /// If the queue was already closed.
    pub fn push(&self, item: T) {
        let mut state = self.lock();
        let closed = state.closed;
        if !closed {
            state.pending.push_back(item);
        }
        drop(state);
        if closed {
            panic!("work queue: push after close");
        }
        self.available.notify_one();
    }

    /// Block until an item is available. Returns `None` once the queue is closed and empty.
    pub fn pop(&self) -> Option<Claim<'_, T>> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.pending.pop_front() {
                state.in_flight += 1;
                return Some(Claim { queue: self, item });
            }
            if state.closed {
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Acknowledge one dequeued item. Only [`Claim`] calls this.
    ///
    /// # Panics
    /// If no item is in flight (double acknowledgement, or acknowledging something never popped).
    fn mark_done(&self) {
        let mut state = self.lock();
        if state.in_flight == 0 {
            drop(state);
            panic!("work queue: mark_done called with no item in flight");
        }
        state.in_flight -= 1;
        let drained = state.is_drained();
        drop(state);
        if drained {
            self.drained.notify_all();
        }
    }

    /// Block until nothing is pending and nothing is in flight. Returns at once if already drained.
    pub fn wait_until_drained(&self) {
        let mut state = self.lock();
        while !state.is_drained() {
            state = self
                .drained
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// No more items will be pushed. Idle workers wake up and exit once the queue is empty.
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}

/// A dequeued item. Marks the item done exactly once, on [`Claim::complete`] or on drop.
pub struct Claim<'a, T> {
    queue: &'a WorkQueue<T>,
    item: T,
}

impl<T> Claim<'_, T> {
    pub fn complete(self) {
        drop(self);
    }
}

impl<T> Deref for Claim<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T> Drop for Claim<'_, T> {
    fn drop(&mut self) {
        self.queue.mark_done();
    }
}

#[cfg(test)]
mod tests {
    use super::WorkQueue;

    #[test]
    #[should_panic(expected = "no item in flight")]
    fn test_mark_done_without_pop_panics() {
        let q: WorkQueue<u32> = WorkQueue::new();
        q.push(1);
        q.mark_done();
    }

    #[test]
    #[should_panic(expected = "no item in flight")]
    fn test_double_mark_done_panics() {
        let q = WorkQueue::new();
        q.push(1);
        let claim = q.pop().unwrap();
        claim.complete();
        q.mark_done();
    }

    #[test]
    fn test_live_claim_keeps_queue_undrained() {
        let q = WorkQueue::new();
        q.push(1);
        let claim = q.pop().unwrap();
        assert_eq!(q.in_flight(), 1);
        assert!(!q.lock().is_drained());
        claim.complete();
        assert!(q.lock().is_drained());
    }
}
