//! Thread-local registry of the pool owning the current thread.
//!
//! Workers register their pool on entry; every other thread reads `None`.
//! Combinators consult the registry to keep follow-up work on the pool
//! that is already running the caller.

use std::cell::RefCell;

use crate::pool::PoolHandle;

thread_local! {
    static CURRENT_POOL: RefCell<Option<PoolHandle>> = RefCell::new(None);
}

/// Marks the calling thread as belonging to `pool` for the rest of its
/// lifetime. Only worker threads do this.
pub(crate) fn register(pool: PoolHandle) {
    CURRENT_POOL.with(|slot| {
        *slot.borrow_mut() = Some(pool);
    });
}

/// The pool owning the calling thread, if it is a worker.
pub(crate) fn current() -> Option<PoolHandle> {
    CURRENT_POOL.with(|slot| slot.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_plain_threads_carry_no_pool() {
        let off_thread = thread::spawn(|| current().is_none());
        assert!(off_thread.join().unwrap());
    }
}
