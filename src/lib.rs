//! rust-minifut: A minimal thread-based Future/Promise runtime
//!
//! This crate provides blocking concurrency primitives built from three
//! cooperating pieces:
//! - A one-shot Future/Promise channel over a shared write-once cell
//! - A fixed-size ThreadPool draining a FIFO queue with persistent workers
//! - Combinators that flatten nested futures and map resolved values
//!
//! Handles are move-only: a Promise is the unique producer for its cell and
//! a Future the unique consumer. Resolution is write-once (a value or an
//! error, never both) and consumption is read-once. Consumers park on a
//! condition variable; there is no reactor and no `async`.
//!
//! ## Scheduling
//!
//! Combinator work runs on the first executor found in this order:
//!
//! - the pool recorded on the input future (see [`Promise::set_pool`] and
//!   [`ThreadPool::spawn`]),
//! - the pool owning the calling thread, if the caller is a worker
//!   ([`ThreadPool::current`]),
//! - a dedicated background thread otherwise.
//!
//! The chosen pool is recorded on the combinator's result future, so a
//! chain of combinators stays on the pool that started it.
//!
//! Every worker thread registers itself in a thread-local registry, so code
//! running inside a pool can always discover its own executor.
//!
//! # Examples
//!
//! ```rust
//! use rust_minifut::{map, Promise, ThreadPool};
//!
//! // Promise/Future round trip.
//! let promise = Promise::new();
//! let future = promise.future().unwrap();
//! promise.set("hello").unwrap();
//! assert_eq!(future.get().unwrap(), "hello");
//!
//! // Pool-backed work, transformed on the same pool.
//! let pool = ThreadPool::new(2).unwrap();
//! let doubled = map(pool.spawn(|| 21), |n| n * 2);
//! assert_eq!(doubled.get().unwrap(), 42);
//! ```
//!
//! Nested results collapse with [`flatten`], heterogeneous tuples with
//! [`flatten_tuple`]:
//!
//! ```rust
//! use rust_minifut::{flatten_tuple, Promise, ThreadPool};
//!
//! let pool = ThreadPool::new(1).unwrap();
//! let inner = pool.spawn(|| vec![1, 2, 3]);
//! let combined = flatten_tuple((7, inner));
//! assert_eq!(combined.get().unwrap(), (7, vec![1, 2, 3]));
//! ```

#![deny(warnings)]

pub mod combinator;
pub mod future;
pub mod pool;
pub mod promise;

mod context;
mod state;

// Re-export core types
pub use combinator::{flatten, flatten_all, flatten_tuple, map, Nesting, Resolve};
pub use future::Future;
pub use pool::{PoolHandle, ThreadPool};
pub use promise::Promise;

/// Error types for the runtime
pub mod error {
    use thiserror::Error;

    /// A type-erased application error carried by a failed future.
    pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

    #[derive(Error, Debug)]
    pub enum PromiseError {
        #[error("Handle has no backing state")]
        Uninitialized,

        #[error("Value already retrieved from this future")]
        AlreadyConsumed,

        #[error("Future already retrieved from this promise")]
        FutureAlreadyRetrieved,

        #[error("Promise already resolved")]
        AlreadySet,

        #[error("Promise dropped before resolving")]
        BrokenPromise,

        #[error("Task failed: {0}")]
        Failed(BoxError),
    }

    impl From<BoxError> for PromiseError {
        fn from(err: BoxError) -> Self {
            PromiseError::Failed(err)
        }
    }

    impl From<String> for PromiseError {
        fn from(msg: String) -> Self {
            PromiseError::Failed(msg.into())
        }
    }

    impl From<&str> for PromiseError {
        fn from(msg: &str) -> Self {
            PromiseError::Failed(msg.into())
        }
    }

    #[derive(Error, Debug)]
    pub enum PoolError {
        #[error("Thread pool requires at least one worker")]
        NoWorkers,

        #[error("Failed to spawn worker thread: {0}")]
        Spawn(#[from] std::io::Error),
    }

    pub type Result<T> = std::result::Result<T, PromiseError>;
}
