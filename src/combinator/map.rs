//! Transform a future's value on an appropriate executor.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::future::Future;
use crate::promise::Promise;

use super::{schedule, select_pool};

/// Applies `f` to the value `future` resolves with and hands back a
/// future for the transformed result.
///
/// The transformation runs on the input future's recorded pool, else on
/// the calling worker's pool, else on a dedicated background thread. `f`
/// runs exactly once, and only after the input resolved successfully: an
/// input error propagates to the result verbatim without invoking `f`.
/// A panic inside `f` is caught and surfaces as a
/// [`Failed`](crate::error::PromiseError::Failed) error carrying the
/// panic message.
pub fn map<T, U, F>(future: Future<T>, f: F) -> Future<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnOnce(T) -> U + Send + 'static,
{
    let (promise, mapped) = Promise::pair();
    let executor = select_pool(future.pool());
    if let Some(pool) = &executor {
        promise.set_pool(pool.clone());
    }

    schedule(executor, move || {
        let value = match future.get() {
            Ok(value) => value,
            Err(err) => {
                let _ = promise.set_error(err);
                return;
            }
        };
        match panic::catch_unwind(AssertUnwindSafe(move || f(value))) {
            Ok(result) => {
                let _ = promise.set(result);
            }
            Err(payload) => {
                let _ = promise.set_error(format!(
                    "Map function panicked: {}",
                    panic_message(payload.as_ref())
                ));
            }
        }
    });

    mapped
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "opaque panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PromiseError;
    use crate::promise::Promise;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_map_transforms_the_value() {
        let (promise, future) = Promise::pair();
        let doubled = map(future, |n: i32| n * 2);
        promise.set(5).unwrap();
        assert_eq!(doubled.get().unwrap(), 10);
    }

    #[test]
    fn test_map_skips_the_function_on_error() {
        let invoked = Arc::new(AtomicBool::new(false));
        let invoked_probe = invoked.clone();

        let (promise, future) = Promise::<i32>::pair();
        let mapped = map(future, move |n| {
            invoked_probe.store(true, Ordering::SeqCst);
            n + 1
        });
        promise.set_error("upstream failed").unwrap();

        match mapped.get() {
            Err(PromiseError::Failed(err)) => {
                assert_eq!(err.to_string(), "upstream failed");
            }
            other => panic!("expected the upstream error, got {:?}", other),
        }
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[test]
    fn test_map_catches_panics_in_the_function() {
        let (promise, future) = Promise::<i32>::pair();
        let mapped: Future<i32> = map(future, |_| panic!("bad arithmetic"));
        promise.set(1).unwrap();

        match mapped.get() {
            Err(PromiseError::Failed(err)) => {
                assert!(err.to_string().contains("bad arithmetic"));
            }
            other => panic!("expected a captured panic, got {:?}", other),
        }
    }

    #[test]
    fn test_maps_chain() {
        let (promise, future) = Promise::pair();
        let chained = map(map(future, |n: i32| n + 1), |n| n * 10);
        promise.set(3).unwrap();
        assert_eq!(chained.get().unwrap(), 40);
    }
}
