//! # Runspace Workers
//!
//! One worker thread per potential concurrent invocation. Each worker pulls
//! submissions from the shared queue and runs them one at a time.
//!
//! ## Per-submission sequence
//! 1. Take the next job off the queue (blocking; exits once the queue is
//!    closed and empty)
//! 2. Check out a context from the free list
//! 3. Run the script on it with panics converted to faults
//! 4. Return the context
//! 5. Call exactly one handler, catching panics
//! 6. Signal the handle
//!
//! Step 6 always happens, so a waiter is never left hanging and the worker
//! survives any number of faulted or panicking submissions.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use scriptpool_api::{ScriptEngine, ScriptError};
use tracing::{debug, warn};
use uuid::Uuid;

use super::handle::InvocationHandle;
use super::invocation::Invocation;
use super::PoolShared;
use crate::invoke::{execute_guarded, panic_message};
use crate::{invocation_span, log_error, log_invocation};

thread_local! {
    /// Id of the pool whose worker runs on this thread, if any.
    static CURRENT_POOL: Cell<Option<Uuid>> = const { Cell::new(None) };
}

/// True when the calling thread is one of `pool_id`'s workers.
pub(crate) fn is_worker_of(pool_id: Uuid) -> bool {
    CURRENT_POOL.with(|pool| pool.get() == Some(pool_id))
}

/// Reports the worker's exit even if its loop unwinds.
struct ExitGuard<'a>(&'a PoolShared);

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        self.0.worker_exited();
    }
}

/// A queued submission together with the handle the pool will signal.
pub(crate) struct Job {
    pub invocation: Invocation,
    pub handle: InvocationHandle,
    pub submitted_at: Instant,
}

pub(crate) struct Worker {
    id: usize,
    shared: Arc<PoolShared>,
    engine: Arc<dyn ScriptEngine>,
    jobs: flume::Receiver<Job>,
}

impl Worker {
    pub fn new(
        id: usize,
        shared: Arc<PoolShared>,
        engine: Arc<dyn ScriptEngine>,
        jobs: flume::Receiver<Job>,
    ) -> Self {
        Self { id, shared, engine, jobs }
    }

    /// Start the worker on a named OS thread that logs through `dispatch`.
    pub fn spawn(self, name: String, dispatch: tracing::Dispatch) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new().name(name).spawn(move || {
            tracing::dispatcher::with_default(&dispatch, || self.run_loop());
        })
    }

    fn run_loop(&self) {
        CURRENT_POOL.with(|pool| pool.set(Some(self.shared.pool_id)));
        let _exit = ExitGuard(&self.shared);
        debug!(worker = self.id, "worker started");
        // recv fails only once every sender is gone and the queue is empty,
        // which is what lets dispose drain queued work.
        while let Ok(job) = self.jobs.recv() {
            self.run_job(job);
        }
        debug!(worker = self.id, "worker stopped");
    }

    fn run_job(&self, job: Job) {
        let Job { invocation, handle, submitted_at } = job;
        let counters = &self.shared.counters;
        counters.queued.fetch_sub(1, Ordering::AcqRel);
        counters.running.fetch_add(1, Ordering::AcqRel);
        handle.mark_running();

        let span = invocation_span!(handle.id(), worker = self.id);
        let _entered = span.enter();
        let queued_for = submitted_at.elapsed();

        let parts = invocation.into_parts();
        let mut context = self.shared.contexts.acquire();
        let context_id = context.id();
        let started = Instant::now();
        let outcome = execute_guarded(self.engine.as_ref(), &parts.script, &parts.parameters, &mut context);
        self.shared.contexts.release(context);
        counters.running.fetch_sub(1, Ordering::AcqRel);

        let elapsed = started.elapsed();
        let signal = match outcome {
            Ok(results) => {
                let count = results.len();
                log_invocation!(
                    "completed",
                    context = %context_id,
                    results = count,
                    queued_ms = queued_for.as_millis() as u64,
                    elapsed_ms = elapsed.as_millis() as u64
                );
                match parts.on_complete {
                    Some(on_complete) => {
                        let state = parts.state;
                        match panic::catch_unwind(AssertUnwindSafe(move || on_complete(results, state))) {
                            Ok(()) => Ok(count),
                            Err(payload) => Err(self.handler_panicked("completion", payload.as_ref())),
                        }
                    }
                    None => Ok(count),
                }
            }
            Err(fault) => {
                log_invocation!(
                    "faulted",
                    context = %context_id,
                    fault = %fault,
                    elapsed_ms = elapsed.as_millis() as u64
                );
                match parts.on_error {
                    Some(on_error) => {
                        let state = parts.state;
                        let delivered = fault.clone();
                        match panic::catch_unwind(AssertUnwindSafe(move || on_error(delivered, state))) {
                            Ok(()) => Err(fault),
                            Err(payload) => Err(self.handler_panicked("error", payload.as_ref())),
                        }
                    }
                    None => {
                        log_error!(fault, invocation = %handle.id(), "fault with no error handler; recorded on handle");
                        Err(fault)
                    }
                }
            }
        };

        match &signal {
            Ok(_) => counters.completed.fetch_add(1, Ordering::AcqRel),
            Err(_) => counters.faulted.fetch_add(1, Ordering::AcqRel),
        };
        if !handle.signal(signal) {
            warn!(invocation = %handle.id(), "handle was already signalled");
        }
    }

    fn handler_panicked(&self, kind: &str, payload: &(dyn std::any::Any + Send)) -> ScriptError {
        let message = panic_message(payload);
        log_error!(message, worker = self.id, handler = kind, "handler panicked");
        ScriptError::HandlerPanicked(format!("{kind} handler: {message}"))
    }
}
