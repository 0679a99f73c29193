//! # Execution Context
//!
//! An `ExecutionContext` is one isolated unit of execution capacity, the
//! equivalent of a thread-bound interpreter instance. It runs one script at a
//! time and keeps *session variables* that survive from one invocation to the
//! next on the same context.
//!
//! ## Ownership
//!
//! - Contexts drawn from a pool are owned by the pool and lent, exclusively, to
//!   one invocation at a time.
//! - Contexts used with the synchronous path are owned by the caller, who
//!   creates them before and drops them after.
//!
//! Parameters are never written into a context. Engines bind them into a
//! per-invocation scope, so one run's parameters cannot leak into the next.

use std::collections::BTreeMap;
use std::fmt;

use crate::value::Value;

/// Identifier of a context, unique within its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub usize);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context-{}", self.0)
    }
}

/// An isolated environment able to run one script at a time.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    id: ContextId,
    invocations: u64,
    variables: BTreeMap<String, Value>,
}

impl ExecutionContext {
    pub fn new(id: usize) -> Self {
        Self {
            id: ContextId(id),
            invocations: 0,
            variables: BTreeMap::new(),
        }
    }

    /// Create a context pre-populated with session variables.
    pub fn with_variables<I, N, V>(id: usize, variables: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        let mut context = Self::new(id);
        for (name, value) in variables {
            context.set_variable(name, value);
        }
        context
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Number of invocations started on this context, faulted ones included.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Called by the execution paths right before a script runs.
    pub fn begin_invocation(&mut self) {
        self.invocations += 1;
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.variables.insert(name.into(), value.into())
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }
}
