//! Fixed-size worker pool with a FIFO task queue and a completion barrier.
//!
//! Tasks are dequeued in submission order but may start and finish in any
//! order. The only synchronization point offered to callers is
//! [`WorkerPool::await_idle`], which returns once the queue is empty and no
//! worker is running a task. The pool assumes a single producer that submits
//! a batch and then waits for it.
//!
//! Dropping the pool drains whatever is still queued, then joins every
//! worker. Submitting after shutdown is impossible since `Drop` consumes the
//! pool.

use crate::trace::trace_warn;
use crate::util::{GridMatchError, GridMatchResult};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct State {
    queue: VecDeque<Task>,
    active: usize,
    stop: bool,
}

struct Shared {
    state: Mutex<State>,
    // Signalled on enqueue and on task completion.
    signal: Condvar,
}

/// Bounded pool of worker threads draining a shared task queue.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `workers` threads.
    pub fn new(workers: usize) -> GridMatchResult<Self> {
        if workers == 0 {
            return Err(GridMatchError::InvalidWorkerCount);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                active: 0,
                stop: false,
            }),
            signal: Condvar::new(),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(workers),
        };
        for idx in 0..workers {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("gridmatch-worker-{idx}"))
                .spawn(move || worker_loop(&shared))
                .map_err(|err| GridMatchError::WorkerSpawn {
                    reason: err.to_string(),
                })?;
            pool.workers.push(handle);
        }

        Ok(pool)
    }

    /// Pool sized to the machine's available parallelism.
    pub fn with_available_parallelism() -> GridMatchResult<Self> {
        Self::new(default_workers())
    }

    /// Number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Enqueues a task without waiting for it.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.state.lock().queue.push_back(Box::new(task));
        self.shared.signal.notify_one();
    }

    /// Blocks until the queue is empty and no task is running.
    pub fn await_idle(&self) {
        let mut state = self.shared.state.lock();
        self.shared
            .signal
            .wait_while(&mut state, |s| !s.queue.is_empty() || s.active > 0);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.state.lock().stop = true;
        self.shared.signal.notify_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                trace_warn!("worker_panicked");
            }
        }
    }
}

/// Worker count used when none is configured.
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            shared
                .signal
                .wait_while(&mut state, |s| s.queue.is_empty() && !s.stop);
            match state.queue.pop_front() {
                Some(task) => {
                    state.active += 1;
                    task
                }
                // Only reachable once stop is set and the queue is drained.
                None => return,
            }
        };

        let _done = ActiveGuard(shared);
        task();
    }
}

/// Releases the active slot even if the task unwinds, so `await_idle`
/// cannot hang on a dead worker.
struct ActiveGuard<'a>(&'a Shared);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.state.lock().active -= 1;
        self.0.signal.notify_all();
    }
}
