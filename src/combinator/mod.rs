//! Combinators over futures: flatten the nested, map the resolved.
//!
//! All combinators follow one scheduling policy: work runs on the pool
//! recorded on the input (or the first input that has one), else on the
//! pool owning the calling thread, else on a dedicated background thread.
//! The chosen pool is recorded on the result future, so follow-on
//! combinators keep running there. Inputs are always moved into the
//! scheduled task.
//!
//! Combinator tasks block on their inputs. A chain scheduled onto one
//! pool consumes a worker per pending stage, so chains deeper than the
//! pool's worker count need the stages submitted in dependency order
//! (which is what the combinators themselves do).

mod flatten;
mod map;
mod resolve;

pub use flatten::{flatten, flatten_all, flatten_tuple};
pub use map::map;
pub use resolve::{Nesting, Resolve};

use std::thread;

use crate::context;
use crate::pool::PoolHandle;

/// Picks the executor for a combinator task: the hinted pool when there
/// is one, else the pool owning the calling thread.
fn select_pool(hint: Option<PoolHandle>) -> Option<PoolHandle> {
    hint.or_else(context::current)
}

/// Runs `task` on the given pool, else on a named background thread. If
/// the task cannot be placed anywhere it is dropped, and any `Promise`
/// it owns surfaces
/// [`BrokenPromise`](crate::error::PromiseError::BrokenPromise) to its
/// consumer.
fn schedule<F>(executor: Option<PoolHandle>, task: F)
where
    F: FnOnce() + Send + 'static,
{
    match executor {
        Some(pool) => {
            tracing::trace!("Scheduling combinator task on pool {}", pool.id());
            pool.execute(task);
        }
        None => {
            let spawned = thread::Builder::new()
                .name("minifut-adhoc".to_string())
                .spawn(task);
            if let Err(err) = spawned {
                tracing::error!("Failed to spawn background thread: {}", err);
            }
        }
    }
}
