//! # Runspace Pool
//!
//! A fixed upper bound of isolated execution contexts servicing concurrent
//! script submissions.
//!
//! ## Key Concepts
//! - Contexts: created between `min_contexts` (at open) and `max_contexts` (on
//!   demand), each lent to one invocation at a time
//! - Workers: `max_contexts` named OS threads pulling from one submission queue
//! - Handles: one per submission, signalled after its handler returns
//!
//! ## Lifecycle
//! `Created -> Active -> Draining -> Disposed`
//!
//! - `open` moves `Created` to `Active` and starts the workers
//! - `close` stops accepting work; queued and running submissions still finish
//! - `dispose` closes, waits for every queued and running submission, joins the
//!   workers and drops the contexts. Nothing in flight is abandoned. A second
//!   `dispose` is a no-op, and dropping the pool disposes it.

mod config;
mod contexts;
mod error;
mod handle;
mod invocation;
mod worker;

pub use config::{ExhaustionStrategy, PoolConfig, DEFAULT_THREAD_NAME_PREFIX};
pub use error::PoolError;
pub use handle::{wait_all, wait_all_async, wait_all_timeout, InvocationHandle, InvocationId, InvocationStatus};
pub use invocation::{CompletionHandler, ErrorHandler, Invocation};

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::anyhow;
use scriptpool_api::{ExecutionContext, Parameters, ResultRecord, Script, ScriptEngine};
use uuid::Uuid;

use self::contexts::ContextSet;
use self::worker::{Job, Worker};
use crate::invoke::execute_guarded;
use crate::{log_error, log_lifecycle, log_scheduler, logging, pool_span};

/// Lifecycle states of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Constructed, not yet opened
    Created = 0,
    /// Accepting submissions
    Active = 1,
    /// No new submissions; existing ones finish
    Draining = 2,
    /// Terminal
    Disposed = 3,
}

impl PoolState {
    fn from_usize(value: usize) -> Self {
        match value {
            0 => PoolState::Created,
            1 => PoolState::Active,
            2 => PoolState::Draining,
            _ => PoolState::Disposed,
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolState::Created => "created",
            PoolState::Active => "active",
            PoolState::Draining => "draining",
            PoolState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Snapshot of pool activity
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub pool_id: Uuid,
    pub state: PoolState,
    pub min_contexts: usize,
    pub max_contexts: usize,
    /// Contexts created so far
    pub created_contexts: usize,
    /// Contexts sitting idle in the free list
    pub available_contexts: usize,
    /// Submissions waiting for a worker
    pub queued: usize,
    /// Invocations currently executing a script
    pub running: usize,
    pub completed: u64,
    pub faulted: u64,
}

#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub queued: AtomicUsize,
    pub running: AtomicUsize,
    pub completed: AtomicU64,
    pub faulted: AtomicU64,
}

/// State shared between the pool and its workers.
#[derive(Debug)]
pub(crate) struct PoolShared {
    pub pool_id: Uuid,
    pub contexts: ContextSet,
    pub counters: PoolCounters,
    state: AtomicUsize,
    /// Worker threads that have not yet left their run loop.
    pub live_workers: AtomicUsize,
    /// Set by `dispose`; tells the last exiting worker to complete it.
    pub dispose_requested: AtomicBool,
}

impl PoolShared {
    pub fn state(&self) -> PoolState {
        PoolState::from_usize(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: PoolState) {
        self.state.store(state as usize, Ordering::SeqCst);
    }

    /// Move `Draining` to `Disposed` and drop the contexts. Only the first
    /// caller does anything; returns whether that was this one.
    pub fn finish_dispose(&self) -> bool {
        let won = self
            .state
            .compare_exchange(
                PoolState::Draining as usize,
                PoolState::Disposed as usize,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if won {
            let dropped = self.contexts.drain();
            log_lifecycle!(self.pool_id, "disposed", contexts = dropped);
        }
        won
    }

    /// Called by each worker as it leaves its run loop.
    pub fn worker_exited(&self) {
        let remaining = self.live_workers.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining == 0 && self.dispose_requested.load(Ordering::SeqCst) {
            self.finish_dispose();
        }
    }
}

/// Submission side and worker threads; guarded together so lifecycle
/// transitions are serialized.
#[derive(Default)]
struct Control {
    sender: Option<flume::Sender<Job>>,
    workers: Option<Vec<JoinHandle<()>>>,
}

/// Bounded pool of execution contexts running script invocations.
///
/// All methods take `&self`; share the pool between threads with `Arc`.
///
/// ```rust
/// use std::sync::Arc;
/// use scriptpool::{CommandEngine, Invocation, PoolConfig, RunspacePool};
///
/// let pool = RunspacePool::new(PoolConfig::new(1, 2), Arc::new(CommandEngine::new())).unwrap();
/// pool.open().unwrap();
/// let handle = pool
///     .submit(Invocation::new("echo done").on_complete(|results, _state| {
///         assert_eq!(results.len(), 1);
///     }))
///     .unwrap();
/// handle.wait();
/// pool.dispose().unwrap();
/// ```
pub struct RunspacePool {
    id: Uuid,
    config: PoolConfig,
    engine: Arc<dyn ScriptEngine>,
    shared: Arc<PoolShared>,
    control: Mutex<Control>,
}

impl fmt::Debug for RunspacePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunspacePool")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("config", &self.config)
            .field("contexts", &self.shared.contexts)
            .finish()
    }
}

impl RunspacePool {
    /// Validate `config` and build a pool in the `Created` state.
    pub fn new(config: PoolConfig, engine: Arc<dyn ScriptEngine>) -> Result<Self, PoolError> {
        config.validate()?;
        let contexts = ContextSet::new(config.max_contexts, config.initial_variables.clone());
        let id = Uuid::new_v4();
        let pool = Self {
            id,
            engine,
            shared: Arc::new(PoolShared {
                pool_id: id,
                contexts,
                counters: PoolCounters::default(),
                state: AtomicUsize::new(PoolState::Created as usize),
                live_workers: AtomicUsize::new(0),
                dispose_requested: AtomicBool::new(false),
            }),
            control: Mutex::new(Control::default()),
            config,
        };
        log_lifecycle!(pool.id, "created", max_contexts = pool.config.max_contexts);
        Ok(pool)
    }

    /// Create and open a pool in one step.
    pub fn open_with(config: PoolConfig, engine: Arc<dyn ScriptEngine>) -> Result<Self, PoolError> {
        let pool = Self::new(config, engine)?;
        pool.open()?;
        Ok(pool)
    }

    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: PoolState) {
        self.shared.set_state(state);
    }

    /// Create the minimum contexts, start the workers and accept submissions.
    pub fn open(&self) -> Result<(), PoolError> {
        let mut control = self.lock_control();
        let state = self.state();
        if state != PoolState::Created {
            return Err(PoolError::InvalidState { operation: "open", state });
        }

        let span = pool_span!(self.id, "open");
        let _entered = span.enter();

        self.shared.contexts.prewarm(self.config.min_contexts);

        let (sender, receiver) = match self.config.queue_capacity {
            Some(capacity) => flume::bounded(capacity),
            None => flume::unbounded(),
        };

        let dispatch = logging::current_subscriber();
        let mut workers = Vec::with_capacity(self.config.max_contexts);
        for worker_id in 0..self.config.max_contexts {
            let worker = Worker::new(
                worker_id,
                Arc::clone(&self.shared),
                Arc::clone(&self.engine),
                receiver.clone(),
            );
            let name = format!("{}-{}", self.config.thread_name_prefix, worker_id);
            self.shared.live_workers.fetch_add(1, Ordering::AcqRel);
            match worker.spawn(name, dispatch.clone()) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    self.shared.live_workers.fetch_sub(1, Ordering::AcqRel);
                    // Disconnect the queue so the workers already started exit.
                    drop(sender);
                    drop(receiver);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    self.shared.contexts.drain();
                    self.set_state(PoolState::Disposed);
                    log_error!(e, pool_id = %self.id, "failed to spawn worker");
                    return Err(PoolError::ThreadSetup(format!("worker {worker_id}: {e}")));
                }
            }
        }

        control.sender = Some(sender);
        control.workers = Some(workers);
        self.set_state(PoolState::Active);
        log_lifecycle!(
            self.id,
            "opened",
            min_contexts = self.config.min_contexts,
            max_contexts = self.config.max_contexts
        );
        Ok(())
    }

    /// Queue an invocation and return its handle.
    ///
    /// With a bounded queue that is full, `ExhaustionStrategy::Block` waits
    /// for space and `ExhaustionStrategy::FailFast` returns
    /// `PoolError::Exhausted`. Script faults never surface here; they go to the
    /// invocation's error handler and are recorded on the handle.
    ///
    /// A submission made from one of this pool's own handlers never blocks:
    /// that thread is a worker the queue may be waiting on, so a full queue
    /// returns `PoolError::Exhausted` whatever the strategy.
    pub fn submit(&self, invocation: Invocation) -> Result<InvocationHandle, PoolError> {
        let state = self.state();
        if state != PoolState::Active {
            return Err(PoolError::NotAccepting { state });
        }
        // Clone the sender so a blocking send does not hold the control lock.
        let sender = match &self.lock_control().sender {
            Some(sender) => sender.clone(),
            None => return Err(PoolError::NotAccepting { state: self.state() }),
        };

        let handle = InvocationHandle::new();
        let job = Job {
            invocation,
            handle: handle.clone(),
            submitted_at: Instant::now(),
        };

        let counters = &self.shared.counters;
        counters.queued.fetch_add(1, Ordering::AcqRel);
        let strategy = if worker::is_worker_of(self.id) {
            ExhaustionStrategy::FailFast
        } else {
            self.config.exhaustion_strategy.clone()
        };
        let sent = match strategy {
            ExhaustionStrategy::Block => sender.send(job).map_err(|_| PoolError::NotAccepting { state: self.state() }),
            ExhaustionStrategy::FailFast => sender.try_send(job).map_err(|e| match e {
                flume::TrySendError::Full(_) => PoolError::Exhausted {
                    max_contexts: self.config.max_contexts,
                    queue_capacity: self.config.queue_capacity.unwrap_or(0),
                },
                flume::TrySendError::Disconnected(_) => PoolError::NotAccepting { state: self.state() },
            }),
        };
        if let Err(e) = sent {
            counters.queued.fetch_sub(1, Ordering::AcqRel);
            log_scheduler!(self.id, "rejected", reason = %e);
            return Err(e);
        }

        log_scheduler!(self.id, "queued", invocation = %handle.id(), queue_length = sender.len());
        Ok(handle)
    }

    /// Run a script on a caller-owned context using this pool's engine.
    ///
    /// Bypasses the pool's contexts and workers entirely; only the engine is
    /// shared. Not available once the pool is disposed.
    pub fn run_synchronously(
        &self,
        script: &Script,
        parameters: &Parameters,
        context: &mut ExecutionContext,
    ) -> Result<Vec<ResultRecord>, PoolError> {
        let state = self.state();
        if state == PoolState::Disposed {
            return Err(PoolError::InvalidState { operation: "run a script on", state });
        }
        Ok(execute_guarded(self.engine.as_ref(), script, parameters, context)?)
    }

    /// Stop accepting submissions. Queued and running work still completes.
    pub fn close(&self) {
        let mut control = self.lock_control();
        if self.state() == PoolState::Active {
            self.set_state(PoolState::Draining);
            control.sender = None;
            log_lifecycle!(self.id, "draining", queued = self.shared.counters.queued.load(Ordering::Acquire));
        }
    }

    /// Close the pool, wait for all submitted work and release every context.
    ///
    /// Called from one of this pool's handlers, `dispose` joins the other
    /// workers and returns without waiting for its own thread; that worker
    /// keeps draining the queue and the last worker to exit moves the pool to
    /// `Disposed`. Queued work is never abandoned either way.
    pub fn dispose(&self) -> Result<(), PoolError> {
        let workers = {
            let mut control = self.lock_control();
            match self.state() {
                PoolState::Created => {
                    self.set_state(PoolState::Disposed);
                    log_lifecycle!(self.id, "disposed", contexts = 0);
                    return Ok(());
                }
                PoolState::Active => {
                    // Flag before disconnecting: workers only exit after that.
                    self.shared.dispose_requested.store(true, Ordering::SeqCst);
                    self.set_state(PoolState::Draining);
                    control.sender = None;
                }
                PoolState::Draining => self.shared.dispose_requested.store(true, Ordering::SeqCst),
                PoolState::Disposed => {}
            }
            // Whoever takes the workers finishes the disposal; everyone else returns.
            match control.workers.take() {
                Some(workers) => workers,
                None => return Ok(()),
            }
        };

        let current = thread::current().id();
        let mut on_worker = false;
        let mut panicked = Vec::new();
        for handle in workers {
            if handle.thread().id() == current {
                on_worker = true;
                continue;
            }
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                panicked.push(name);
            }
        }

        if on_worker {
            log_lifecycle!(self.id, "dispose deferred to last worker");
        } else {
            // A no-op if the last worker already completed it.
            self.shared.finish_dispose();
        }

        if panicked.is_empty() {
            Ok(())
        } else {
            Err(PoolError::Other(anyhow!("worker threads panicked: {}", panicked.join(", "))))
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> PoolState {
        self.shared.state()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn ScriptEngine> {
        &self.engine
    }

    /// Contexts currently idle in the free list.
    pub fn available_contexts(&self) -> usize {
        self.shared.contexts.available()
    }

    pub fn metrics(&self) -> PoolMetrics {
        let counters = &self.shared.counters;
        PoolMetrics {
            pool_id: self.id,
            state: self.state(),
            min_contexts: self.config.min_contexts,
            max_contexts: self.shared.contexts.max(),
            created_contexts: self.shared.contexts.created(),
            available_contexts: self.shared.contexts.available(),
            queued: counters.queued.load(Ordering::Acquire),
            running: counters.running.load(Ordering::Acquire),
            completed: counters.completed.load(Ordering::Acquire),
            faulted: counters.faulted.load(Ordering::Acquire),
        }
    }
}

impl Drop for RunspacePool {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            log_error!(e, pool_id = %self.id, "dispose on drop failed");
        }
    }
}
