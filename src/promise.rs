//! Producer handle of the one-shot result channel.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{PromiseError, Result};
use crate::future::Future;
use crate::pool::PoolHandle;
use crate::state::SharedState;

/// The unique producer of a one-shot result.
///
/// A `Promise` owns a fresh cell from the moment it is constructed and
/// resolves it exactly once, with [`set`](Promise::set) or
/// [`set_error`](Promise::set_error). Dropping an unresolved `Promise`
/// wakes the consumer with
/// [`BrokenPromise`](crate::error::PromiseError::BrokenPromise).
pub struct Promise<T> {
    state: Arc<SharedState<T>>,
    future_taken: AtomicBool,
}

impl<T> Promise<T> {
    pub fn new() -> Self {
        Promise {
            state: Arc::new(SharedState::new()),
            future_taken: AtomicBool::new(false),
        }
    }

    /// A fresh cell with both handles in one step.
    ///
    /// The consumer handle counts as retrieved, so `future` on the
    /// returned `Promise` fails like any second retrieval would.
    pub fn pair() -> (Promise<T>, Future<T>) {
        let promise = Promise::new();
        let future = Future::from_state(promise.state.clone());
        promise.future_taken.store(true, Ordering::SeqCst);
        (promise, future)
    }

    /// Hands out the consumer handle. There is only one: a second call
    /// fails with
    /// [`FutureAlreadyRetrieved`](crate::error::PromiseError::FutureAlreadyRetrieved).
    pub fn future(&self) -> Result<Future<T>> {
        if self.future_taken.swap(true, Ordering::SeqCst) {
            return Err(PromiseError::FutureAlreadyRetrieved);
        }
        Ok(Future::from_state(self.state.clone()))
    }

    /// Resolves the cell with a value and wakes waiters.
    ///
    /// Write-once: racing resolutions are serialized by the cell's mutex
    /// and every attempt after the first fails with
    /// [`AlreadySet`](crate::error::PromiseError::AlreadySet).
    pub fn set(&self, value: T) -> Result<()> {
        let mut slots = self.state.slots.lock().unwrap();
        if self.state.is_ready() {
            return Err(PromiseError::AlreadySet);
        }
        slots.value = Some(value);
        self.state.ready.store(true, Ordering::SeqCst);
        drop(slots);
        self.state.resolved.notify_all();
        Ok(())
    }

    /// Resolves the cell with an error instead of a value.
    ///
    /// Accepts an application error (anything convertible into
    /// [`PromiseError`](crate::error::PromiseError), including plain
    /// messages) and stores it for the consumer to receive verbatim from
    /// `get`. Mutually exclusive with `set` under the same write-once
    /// discipline.
    pub fn set_error(&self, err: impl Into<PromiseError>) -> Result<()> {
        let mut slots = self.state.slots.lock().unwrap();
        if self.state.is_ready() {
            return Err(PromiseError::AlreadySet);
        }
        slots.error = Some(err.into());
        self.state.ready.store(true, Ordering::SeqCst);
        drop(slots);
        self.state.resolved.notify_all();
        Ok(())
    }

    /// Records the pool this result belongs to; combinators use it to pick
    /// an executor.
    pub fn set_pool(&self, pool: PoolHandle) {
        let mut slots = self.state.slots.lock().unwrap();
        slots.pool = Some(pool);
    }

    /// Whether the cell has been resolved (by either `set` or `set_error`).
    pub fn is_resolved(&self) -> bool {
        self.state.is_ready()
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Promise::new()
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        let slots = self.state.slots.lock().unwrap();
        self.state.has_producer.store(false, Ordering::SeqCst);
        drop(slots);
        self.state.resolved.notify_all();
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("resolved", &self.is_resolved())
            .field("future_taken", &self.future_taken.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_is_handed_out_once() {
        let promise = Promise::<i32>::new();
        assert!(promise.future().is_ok());
        assert!(matches!(
            promise.future(),
            Err(PromiseError::FutureAlreadyRetrieved)
        ));
    }

    #[test]
    fn test_pair_counts_as_retrieval() {
        let (promise, future) = Promise::pair();
        assert!(matches!(
            promise.future(),
            Err(PromiseError::FutureAlreadyRetrieved)
        ));
        promise.set(3).unwrap();
        assert_eq!(future.get().unwrap(), 3);
    }

    #[test]
    fn test_set_is_write_once() {
        let promise = Promise::new();
        promise.set(42).unwrap();
        assert!(matches!(promise.set(43), Err(PromiseError::AlreadySet)));
        assert!(matches!(
            promise.set_error("too late"),
            Err(PromiseError::AlreadySet)
        ));
    }

    #[test]
    fn test_set_error_reaches_consumer() {
        let promise = Promise::<i32>::new();
        let future = promise.future().unwrap();
        promise.set_error("disk offline").unwrap();

        match future.get() {
            Err(PromiseError::Failed(err)) => {
                assert_eq!(err.to_string(), "disk offline");
            }
            other => panic!("expected a Failed error, got {:?}", other),
        }
    }

    #[test]
    fn test_propagated_error_stays_verbatim() {
        let promise = Promise::<i32>::new();
        let future = promise.future().unwrap();
        promise.set_error(PromiseError::BrokenPromise).unwrap();
        assert!(matches!(future.get(), Err(PromiseError::BrokenPromise)));
    }

    #[test]
    fn test_default_behaves_like_new() {
        let promise = Promise::default();
        let future = promise.future().unwrap();
        promise.set(1u8).unwrap();
        assert_eq!(future.get().unwrap(), 1);
    }

    #[test]
    fn test_resolution_status_is_visible() {
        let promise = Promise::new();
        assert!(!promise.is_resolved());
        promise.set(()).unwrap();
        assert!(promise.is_resolved());
    }
}

#[cfg(test)]
mod concurrency_tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_racing_setters_have_one_winner() {
        let promise = Arc::new(Promise::new());
        let future = promise.future().unwrap();

        let setters: Vec<_> = (0..2)
            .map(|i| {
                let promise = promise.clone();
                thread::spawn(move || promise.set(i).is_ok())
            })
            .collect();

        let wins = setters
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(wins, 1);

        let value = future.get().unwrap();
        assert!(value == 0 || value == 1);
    }
}
