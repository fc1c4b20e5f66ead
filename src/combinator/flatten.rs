//! Flatten nested futures, collections of futures and mixed tuples.

use crate::future::Future;
use crate::promise::Promise;

use super::resolve::{Nesting, Resolve};
use super::{schedule, select_pool};

/// Collapses every future layer of `future` into a single one.
///
/// A future that is already flat passes through unchanged: no new
/// promise, no task. A nested future is unwrapped layer by layer in a
/// background task; the first error at any layer resolves the result
/// with that error.
pub fn flatten<T: Resolve>(future: Future<T>) -> Future<T::Output> {
    match T::nesting(future) {
        Nesting::Flat(flat) => flat,
        Nesting::Nested(nested) => resolve_in_background(nested),
    }
}

/// Turns an ordered collection of futures into a future of the collected
/// values, preserving order.
///
/// The inputs are consumed up front and retrieved one by one in a
/// background task. The first error resolves the aggregate with that
/// error and the remaining futures are abandoned unread. An empty input
/// resolves to an empty `Vec`.
pub fn flatten_all<T, I>(futures: I) -> Future<Vec<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Future<T>>,
{
    let futures: Vec<Future<T>> = futures.into_iter().collect();
    let (promise, aggregate) = Promise::pair();
    let executor = select_pool(futures.iter().find_map(|future| future.pool()));
    if let Some(pool) = &executor {
        promise.set_pool(pool.clone());
    }

    schedule(executor, move || {
        let mut values = Vec::with_capacity(futures.len());
        for future in futures {
            match future.get() {
                Ok(value) => values.push(value),
                Err(err) => {
                    let _ = promise.set_error(err);
                    return;
                }
            }
        }
        let _ = promise.set(values);
    });

    aggregate
}

/// Unwraps every slot of a tuple, however deeply each one is nested, and
/// resolves to the tuple of final values with slot order preserved.
///
/// Slots are unwrapped sequentially in slot order inside one background
/// task; the first slot error resolves the aggregate with that error and
/// later slots are not consumed. Any [`Resolve`] value is accepted, but
/// plain futures are better served by [`flatten`], which can pass them
/// through without a task.
pub fn flatten_tuple<T: Resolve>(tuple: T) -> Future<T::Output> {
    resolve_in_background(tuple)
}

/// Fully resolves `value` on the executor its pool hint (or the calling
/// worker's pool) suggests, forwarding the outcome into a fresh promise.
fn resolve_in_background<R: Resolve>(value: R) -> Future<R::Output> {
    let (promise, future) = Promise::pair();
    let executor = select_pool(value.pool_hint());
    if let Some(pool) = &executor {
        promise.set_pool(pool.clone());
    }

    schedule(executor, move || match value.resolve() {
        Ok(resolved) => {
            let _ = promise.set(resolved);
        }
        Err(err) => {
            let _ = promise.set_error(err);
        }
    });

    future
}
