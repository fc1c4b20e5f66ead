//! Shared write-once cell connecting a Promise to its Future.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

use crate::error::PromiseError;
use crate::pool::PoolHandle;

/// The cell both handles point at. Slots are guarded by the mutex; the
/// atomics mirror the publication state for lock-free `is_ready` reads.
/// Every store a condvar waiter's predicate depends on happens while the
/// mutex is held, so a notification cannot slip between the predicate
/// check and the park.
pub(crate) struct SharedState<T> {
    pub(crate) slots: Mutex<Slots<T>>,
    pub(crate) resolved: Condvar,
    pub(crate) ready: AtomicBool,
    pub(crate) has_producer: AtomicBool,
}

/// Mutex-guarded contents: exactly one of `value`/`error` is ever written.
pub(crate) struct Slots<T> {
    pub(crate) value: Option<T>,
    pub(crate) error: Option<PromiseError>,
    pub(crate) pool: Option<PoolHandle>,
}

impl<T> SharedState<T> {
    pub(crate) fn new() -> Self {
        SharedState {
            slots: Mutex::new(Slots {
                value: None,
                error: None,
                pool: None,
            }),
            resolved: Condvar::new(),
            ready: AtomicBool::new(false),
            has_producer: AtomicBool::new(true),
        }
    }

    /// Lock-free fast path; `ready` transitions false to true exactly once.
    pub(crate) fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub(crate) fn has_producer(&self) -> bool {
        self.has_producer.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cell_is_pending_with_live_producer() {
        let state = SharedState::<i32>::new();
        assert!(!state.is_ready());
        assert!(state.has_producer());

        let slots = state.slots.lock().unwrap();
        assert!(slots.value.is_none());
        assert!(slots.error.is_none());
        assert!(slots.pool.is_none());
    }
}
