//! # Invocation Handles
//!
//! Every submission returns an `InvocationHandle`. The pool signals it exactly
//! once, after the submission's completion or error handler has returned, so a
//! caller that waits on the handle observes everything the handler did.
//!
//! ## Waiting
//! - `wait` blocks the calling thread
//! - `wait_timeout` blocks for at most the given duration
//! - `wait_async` suspends a task instead of blocking a thread
//! - `wait_all`, `wait_all_timeout` and `wait_all_async` cover a set of handles
//!
//! A handle never carries results; those go to the completion handler. It does
//! record the fault of an invocation that failed, which is how faults stay
//! observable when no error handler was supplied.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use scriptpool_api::ScriptError;
use tokio::sync::Notify;
use uuid::Uuid;

/// Unique identifier of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvocationId(Uuid);

impl InvocationId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    /// Waiting in the submission queue
    Pending,
    /// Picked up by a worker
    Running,
    /// Completion handler (if any) returned
    Completed,
    /// Script faulted or a handler panicked; see `InvocationHandle::fault`
    Faulted,
}

impl InvocationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, InvocationStatus::Completed | InvocationStatus::Faulted)
    }
}

#[derive(Debug)]
struct HandleState {
    status: InvocationStatus,
    fault: Option<ScriptError>,
    result_count: usize,
}

struct HandleInner {
    id: InvocationId,
    state: Mutex<HandleState>,
    done: Condvar,
    notify: Notify,
}

/// Caller-side view of one submission.
///
/// Cloning is cheap; all clones observe the same signal.
#[derive(Clone)]
pub struct InvocationHandle {
    inner: Arc<HandleInner>,
}

impl fmt::Debug for InvocationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("InvocationHandle")
            .field("id", &self.inner.id)
            .field("status", &state.status)
            .field("fault", &state.fault)
            .finish()
    }
}

impl InvocationHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: InvocationId::new(),
                state: Mutex::new(HandleState {
                    status: InvocationStatus::Pending,
                    fault: None,
                    result_count: 0,
                }),
                done: Condvar::new(),
                notify: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandleState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> InvocationId {
        self.inner.id
    }

    pub fn status(&self) -> InvocationStatus {
        self.lock().status
    }

    /// True once the handle has been signalled.
    pub fn is_completed(&self) -> bool {
        self.status().is_terminal()
    }

    /// The recorded fault of a faulted invocation.
    pub fn fault(&self) -> Option<ScriptError> {
        self.lock().fault.clone()
    }

    /// Number of result records delivered to the completion handler.
    pub fn result_count(&self) -> usize {
        self.lock().result_count
    }

    /// Block until the invocation has finished and its handler has returned.
    pub fn wait(&self) -> InvocationStatus {
        let mut state = self.lock();
        while !state.status.is_terminal() {
            state = self.inner.done.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.status
    }

    /// Like `wait`, giving up after `timeout`. Returns `None` on expiry.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<InvocationStatus> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while !state.status.is_terminal() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            state = self
                .inner
                .done
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        Some(state.status)
    }

    /// Suspend the current task until the handle is signalled.
    pub async fn wait_async(&self) -> InvocationStatus {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a signal in between is not lost.
            notified.as_mut().enable();
            let status = self.status();
            if status.is_terminal() {
                return status;
            }
            notified.await;
        }
    }

    pub(crate) fn mark_running(&self) {
        let mut state = self.lock();
        if state.status == InvocationStatus::Pending {
            state.status = InvocationStatus::Running;
        }
    }

    /// Signal completion. Only the first call has any effect; later calls
    /// return `false` and leave the recorded outcome untouched.
    pub(crate) fn signal(&self, outcome: Result<usize, ScriptError>) -> bool {
        {
            let mut state = self.lock();
            if state.status.is_terminal() {
                return false;
            }
            match outcome {
                Ok(count) => {
                    state.status = InvocationStatus::Completed;
                    state.result_count = count;
                }
                Err(fault) => {
                    state.status = InvocationStatus::Faulted;
                    state.fault = Some(fault);
                }
            }
        }
        self.inner.done.notify_all();
        self.inner.notify.notify_waiters();
        true
    }
}

/// Block until every handle has been signalled.
pub fn wait_all(handles: &[InvocationHandle]) -> Vec<InvocationStatus> {
    handles.iter().map(InvocationHandle::wait).collect()
}

/// Block until every handle has been signalled or `timeout` has elapsed.
/// Returns `true` when all handles finished in time.
pub fn wait_all_timeout(handles: &[InvocationHandle], timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    handles.iter().all(|handle| {
        let remaining = deadline.saturating_duration_since(Instant::now());
        handle.wait_timeout(remaining).is_some()
    })
}

/// Await every handle concurrently.
pub async fn wait_all_async(handles: &[InvocationHandle]) -> Vec<InvocationStatus> {
    futures::future::join_all(handles.iter().map(InvocationHandle::wait_async)).await
}
