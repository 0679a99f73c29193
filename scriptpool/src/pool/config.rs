use std::collections::HashSet;

use scriptpool_api::Value;

use super::error::PoolError;

pub const DEFAULT_THREAD_NAME_PREFIX: &str = "runspace";

// --- Configuration Enums ---

/// Defines what `submit` does when the submission queue is full.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExhaustionStrategy {
    /// The submitter blocks until queue space becomes available.
    #[default]
    Block,
    /// The submission is rejected immediately with `PoolError::Exhausted`.
    FailFast,
}

// --- Pool Configuration ---

/// Configuration for a `RunspacePool`.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Contexts created when the pool is opened.
    pub min_contexts: usize,

    /// Upper bound on contexts, and therefore on concurrently running invocations.
    pub max_contexts: usize,

    /// Capacity of the submission queue. `None` is unbounded; `Some(0)` disables
    /// queuing so a submission is only accepted when a worker is idle.
    pub queue_capacity: Option<usize>,

    /// Behavior of `submit` when the queue is full.
    pub exhaustion_strategy: ExhaustionStrategy,

    /// Worker threads are named `<prefix>-<n>`.
    pub thread_name_prefix: String,

    /// Initial session state: variables seeded into every new context.
    pub initial_variables: Vec<(String, Value)>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_contexts: 1,
            max_contexts: num_cpus::get(),
            queue_capacity: None,
            exhaustion_strategy: ExhaustionStrategy::Block,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            initial_variables: Vec::new(),
        }
    }
}

impl PoolConfig {
    /// Configuration with the given context bounds and defaults elsewhere.
    pub fn new(min_contexts: usize, max_contexts: usize) -> Self {
        Self {
            min_contexts,
            max_contexts,
            ..Default::default()
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn with_exhaustion_strategy(mut self, strategy: ExhaustionStrategy) -> Self {
        self.exhaustion_strategy = strategy;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Add a variable to the initial session state of every context.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.initial_variables.push((name.into(), value.into()));
        self
    }

    /// Check the bounds and the initial session state.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_contexts == 0 {
            return Err(PoolError::InvalidConfig("max_contexts must be at least 1".into()));
        }
        if self.min_contexts > self.max_contexts {
            return Err(PoolError::InvalidConfig(format!(
                "min_contexts ({}) exceeds max_contexts ({})",
                self.min_contexts, self.max_contexts
            )));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(PoolError::InvalidConfig("thread_name_prefix must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for (name, _) in &self.initial_variables {
            if !seen.insert(name.as_str()) {
                return Err(PoolError::InvalidConfig(format!(
                    "initial variable {name} is defined more than once"
                )));
            }
        }
        Ok(())
    }
}
