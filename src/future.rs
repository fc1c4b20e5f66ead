//! Consumer handle of the one-shot result channel.
//!
//! A `Future` is the read side of the write-once cell that its
//! [`Promise`](crate::Promise) resolves. Waiting parks the caller on the
//! cell's condition variable; there is no polling loop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{PromiseError, Result};
use crate::pool::PoolHandle;
use crate::state::SharedState;

/// The unique consumer of a one-shot result.
///
/// A default-constructed `Future` holds no backing state and every
/// operation on it fails with
/// [`Uninitialized`](crate::error::PromiseError::Uninitialized); the same
/// applies to the empty handle `mem::take` leaves behind. The handle is
/// deliberately not `Clone`: read-once is part of the contract.
pub struct Future<T> {
    state: Option<Arc<SharedState<T>>>,
    consumed: AtomicBool,
}

impl<T> Future<T> {
    pub(crate) fn from_state(state: Arc<SharedState<T>>) -> Self {
        Future {
            state: Some(state),
            consumed: AtomicBool::new(false),
        }
    }

    /// Lock-free check of whether the producer has resolved the cell.
    pub fn is_ready(&self) -> Result<bool> {
        let state = self.state.as_ref().ok_or(PromiseError::Uninitialized)?;
        Ok(state.is_ready())
    }

    /// Blocks until the cell is resolved or the producer disappears.
    ///
    /// Returns without error in both cases; `get` distinguishes them.
    pub fn wait(&self) -> Result<()> {
        let state = self.state.as_ref().ok_or(PromiseError::Uninitialized)?;
        let mut slots = state.slots.lock().unwrap();
        while !state.is_ready() && state.has_producer() {
            slots = state.resolved.wait(slots).unwrap();
        }
        drop(slots);
        Ok(())
    }

    /// Blocks until resolution and moves the result out.
    ///
    /// The handle is marked consumed on entry, so a second call fails with
    /// [`AlreadyConsumed`](crate::error::PromiseError::AlreadyConsumed)
    /// even while the first is still blocked in `wait`. If the producer
    /// was dropped without resolving, this fails with
    /// [`BrokenPromise`](crate::error::PromiseError::BrokenPromise); an
    /// error stored by the producer is returned verbatim.
    pub fn get(&self) -> Result<T> {
        if self.consumed.swap(true, Ordering::SeqCst) {
            return Err(PromiseError::AlreadyConsumed);
        }
        self.wait()?;

        let state = self.state.as_ref().ok_or(PromiseError::Uninitialized)?;
        let mut slots = state.slots.lock().unwrap();
        if !state.is_ready() {
            return Err(PromiseError::BrokenPromise);
        }
        if let Some(err) = slots.error.take() {
            return Err(err);
        }
        slots.value.take().ok_or(PromiseError::AlreadyConsumed)
    }

    /// The pool recorded on this result, if any.
    pub fn pool(&self) -> Option<PoolHandle> {
        let state = self.state.as_ref()?;
        let slots = state.slots.lock().unwrap();
        slots.pool.clone()
    }
}

impl<T> Default for Future<T> {
    /// An empty handle with no backing state.
    fn default() -> Self {
        Future {
            state: None,
            consumed: AtomicBool::new(false),
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("initialized", &self.state.is_some())
            .field(
                "ready",
                &self.state.as_ref().map(|s| s.is_ready()).unwrap_or(false),
            )
            .field("consumed", &self.consumed.load(Ordering::SeqCst))
            .finish()
    }
}


#[cfg(test)]
mod concurrency_tests {
    use super::*;
    use crate::promise::Promise;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_get_blocks_until_cross_thread_set() {
        let promise = Promise::new();
        let future = promise.future().unwrap();

        let setter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            promise.set(99).unwrap();
        });

        assert_eq!(future.get().unwrap(), 99);
        setter.join().unwrap();
    }

    #[test]
    fn test_dropped_promise_breaks_waiters() {
        let promise = Promise::<i32>::new();
        let future = promise.future().unwrap();

        let dropper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            drop(promise);
        });

        // Must resolve to an error rather than hang.
        assert!(matches!(future.get(), Err(PromiseError::BrokenPromise)));
        dropper.join().unwrap();
    }

    #[test]
    fn test_wait_returns_once_resolved() {
        let promise = Promise::new();
        let future = promise.future().unwrap();

        let setter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            promise.set("done").unwrap();
        });

        future.wait().unwrap();
        assert!(future.is_ready().unwrap());
        assert_eq!(future.get().unwrap(), "done");
        setter.join().unwrap();
    }
}
