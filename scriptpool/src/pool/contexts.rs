use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_queue::ArrayQueue;
use scriptpool_api::{ExecutionContext, Value};
use tracing::{debug, trace};

/// Interval after which a waiting worker re-checks the free list even
/// without a wakeup.
const ACQUIRE_RECHECK_INTERVAL: Duration = Duration::from_millis(10);

/// The pool's execution contexts.
///
/// Free contexts sit in a lock-free bounded queue with room for every context
/// the pool may ever create, so returning a context never fails. A context is
/// popped by exactly one worker, which owns it until it pushes it back.
///
/// Contexts are created lazily: `prewarm` creates the configured minimum and
/// `acquire` creates more on demand while fewer than `max` exist. Creation is
/// claimed with a compare-and-swap on the created count so the bound holds
/// under concurrent acquisition.
pub(crate) struct ContextSet {
    free: ArrayQueue<ExecutionContext>,
    created: AtomicUsize,
    max: usize,
    initial_variables: Vec<(String, Value)>,
    // Parking spot for workers when every context is checked out.
    wait_lock: Mutex<()>,
    returned: Condvar,
}

impl fmt::Debug for ContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSet")
            .field("created", &self.created())
            .field("available", &self.available())
            .field("max", &self.max)
            .finish()
    }
}

impl ContextSet {
    pub fn new(max: usize, initial_variables: Vec<(String, Value)>) -> Self {
        Self {
            free: ArrayQueue::new(max.max(1)),
            created: AtomicUsize::new(0),
            max,
            initial_variables,
            wait_lock: Mutex::new(()),
            returned: Condvar::new(),
        }
    }

    /// Create contexts until at least `min` exist.
    pub fn prewarm(&self, min: usize) {
        while self.created() < min {
            match self.try_create() {
                Some(context) => self.release(context),
                None => break,
            }
        }
        debug!(created = self.created(), "contexts prewarmed");
    }

    /// Take a free context, creating one if the bound allows, otherwise
    /// waiting for one to be released.
    pub fn acquire(&self) -> ExecutionContext {
        loop {
            if let Some(context) = self.free.pop() {
                return context;
            }
            if let Some(context) = self.try_create() {
                return context;
            }
            let guard = self.wait_lock.lock().unwrap_or_else(PoisonError::into_inner);
            if self.free.is_empty() {
                trace!("waiting for a free context");
                let _ = self
                    .returned
                    .wait_timeout(guard, ACQUIRE_RECHECK_INTERVAL)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }
    }

    /// Hand a context back to the free list.
    pub fn release(&self, context: ExecutionContext) {
        if let Err(context) = self.free.push(context) {
            // Cannot happen while created <= max; drop it and free its slot.
            debug!(context = %context.id(), "free list full, dropping context");
            self.created.fetch_sub(1, Ordering::AcqRel);
        }
        let _guard = self.wait_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.returned.notify_one();
    }

    /// Drop every free context. Called once the workers are gone.
    pub fn drain(&self) -> usize {
        let mut dropped = 0;
        while self.free.pop().is_some() {
            dropped += 1;
        }
        dropped
    }

    fn try_create(&self) -> Option<ExecutionContext> {
        let mut current = self.created.load(Ordering::Acquire);
        loop {
            if current >= self.max {
                return None;
            }
            match self.created.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    let context = ExecutionContext::with_variables(
                        current,
                        self.initial_variables.iter().cloned(),
                    );
                    trace!(context = %context.id(), "context created");
                    return Some(context);
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Acquire)
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_prewarm_creates_minimum() {
        let set = ContextSet::new(4, vec![("greeting".to_string(), Value::from("hi"))]);
        set.prewarm(2);
        assert_eq!(set.created(), 2);
        assert_eq!(set.available(), 2);

        let context = set.acquire();
        assert_eq!(context.variable("greeting"), Some(&Value::from("hi")));
        set.release(context);
    }

    #[test]
    fn test_acquire_grows_up_to_max() {
        let set = ContextSet::new(2, Vec::new());
        let a = set.acquire();
        let b = set.acquire();
        assert_ne!(a.id(), b.id());
        assert_eq!(set.created(), 2);
        assert_eq!(set.available(), 0);
        set.release(a);
        set.release(b);
        assert_eq!(set.available(), 2);
        assert_eq!(set.drain(), 2);
    }

    #[test]
    fn test_acquire_waits_for_release() {
        let set = Arc::new(ContextSet::new(1, Vec::new()));
        let held = set.acquire();
        let id = held.id();

        let waiter = {
            let set = Arc::clone(&set);
            thread::spawn(move || set.acquire().id())
        };
        thread::sleep(Duration::from_millis(30));
        set.release(held);

        assert_eq!(waiter.join().unwrap(), id);
        assert_eq!(set.created(), 1);
    }
}
