//! Fixed-size worker pool with a FIFO task queue.
//!
//! Workers are persistent threads parked on a condition variable. Tasks
//! are boxed zero-argument closures run strictly in submission order by
//! whichever worker wakes first. Shutdown (explicit or on drop) wakes
//! every worker, but a worker only exits once the queue is empty, so
//! every task submitted before shutdown still runs.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::context;
use crate::error::PoolError;
use crate::future::Future;
use crate::promise::Promise;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Queue and shutdown flag share one mutex; the flag cannot change
/// between a worker's predicate check and its park.
struct PoolQueue {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

struct PoolShared {
    queue: Mutex<PoolQueue>,
    job_available: Condvar,
}

/// Cloneable submission handle onto a pool.
///
/// Handles stay valid after the [`ThreadPool`] itself is gone: submitting
/// to a pool that has shut down drops the task (and any `Promise` inside
/// it then surfaces as
/// [`BrokenPromise`](crate::error::PromiseError::BrokenPromise) to its
/// consumer) instead of queueing work nobody will run.
#[derive(Clone)]
pub struct PoolHandle {
    shared: Arc<PoolShared>,
}

impl PoolHandle {
    /// Enqueues a task and wakes one worker. Never blocks on execution.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut queue = self.shared.queue.lock().unwrap();
        if queue.shutdown {
            drop(queue);
            tracing::warn!("Task submitted to a stopped pool; dropping it");
            return;
        }
        queue.jobs.push_back(Box::new(task));
        drop(queue);
        self.shared.job_available.notify_one();
        tracing::trace!("Task enqueued on pool {}", self.id());
    }

    /// Runs a value-returning closure on the pool and hands back a
    /// [`Future`] for its result, already associated with this pool.
    pub fn spawn<T, F>(&self, f: F) -> Future<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (promise, future) = Promise::pair();
        promise.set_pool(self.clone());
        self.execute(move || {
            let _ = promise.set(f());
        });
        future
    }

    /// Identity of the underlying pool, stable across handle clones.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.shared) as usize
    }

    /// Whether two handles submit to the same pool.
    pub fn same_pool(&self, other: &PoolHandle) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolHandle").field("id", &self.id()).finish()
    }
}

/// A fixed-size pool of persistent worker threads.
///
/// Dropping the pool shuts it down: remaining queued tasks are drained,
/// then every worker is joined.
pub struct ThreadPool {
    handle: PoolHandle,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Spawns exactly `workers` named worker threads.
    pub fn new(workers: usize) -> Result<ThreadPool, PoolError> {
        if workers == 0 {
            return Err(PoolError::NoWorkers);
        }

        let shared = Arc::new(PoolShared {
            queue: Mutex::new(PoolQueue {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            job_available: Condvar::new(),
        });
        let handle = PoolHandle { shared };

        let mut worker_handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let worker_handle = handle.clone();
            let spawned = thread::Builder::new()
                .name(format!("minifut-worker-{}", index))
                .spawn(move || worker_loop(worker_handle, index));
            match spawned {
                Ok(join_handle) => worker_handles.push(join_handle),
                Err(err) => {
                    tracing::error!("Failed to spawn worker {}: {}", index, err);
                    shutdown_and_join(&handle, &mut worker_handles);
                    return Err(PoolError::Spawn(err));
                }
            }
        }

        tracing::info!("Thread pool started with {} workers", workers);
        Ok(ThreadPool {
            handle,
            workers: worker_handles,
        })
    }

    /// A pool with one worker per available CPU.
    pub fn with_default_workers() -> Result<ThreadPool, PoolError> {
        Self::new(num_cpus::get())
    }

    /// The pool owning the calling thread, if the caller is a worker.
    pub fn current() -> Option<PoolHandle> {
        context::current()
    }

    /// Enqueues a task and wakes one worker. Never blocks on execution.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.execute(task);
    }

    /// Runs a value-returning closure on the pool; see
    /// [`PoolHandle::spawn`].
    pub fn spawn<T, F>(&self, f: F) -> Future<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.handle.spawn(f)
    }

    /// A cloneable submission handle onto this pool.
    pub fn handle(&self) -> PoolHandle {
        self.handle.clone()
    }

    pub fn id(&self) -> usize {
        self.handle.id()
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Shuts down and joins every worker. Equivalent to dropping the
    /// pool, spelled out for call sites that want the intent visible.
    pub fn join(self) {
        drop(self);
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        tracing::info!("Shutting down thread pool {}", self.handle.id());
        shutdown_and_join(&self.handle, &mut self.workers);
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("id", &self.handle.id())
            .field("workers", &self.workers.len())
            .finish()
    }
}

/// Raises the shutdown flag under the queue lock, wakes every worker and
/// joins them. Workers drain the queue before exiting.
fn shutdown_and_join(handle: &PoolHandle, workers: &mut Vec<JoinHandle<()>>) {
    {
        let mut queue = handle.shared.queue.lock().unwrap();
        queue.shutdown = true;
    }
    handle.shared.job_available.notify_all();

    for worker in workers.drain(..) {
        if worker.join().is_err() {
            tracing::error!("Worker thread panicked during shutdown");
        }
    }
}

fn worker_loop(handle: PoolHandle, index: usize) {
    context::register(handle.clone());
    tracing::debug!("Worker {} started", index);

    loop {
        let job = {
            let mut queue = handle.shared.queue.lock().unwrap();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    break job;
                }
                if queue.shutdown {
                    tracing::debug!("Worker {} exiting", index);
                    return;
                }
                queue = handle.shared.job_available.wait(queue).unwrap();
            }
        };

        // Run outside the queue lock; a panicking task must not take the
        // worker down with it.
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!("Worker {} task panicked", index);
        }
    }
}
