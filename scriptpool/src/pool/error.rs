use scriptpool_api::ScriptError;
use thiserror::Error;

use super::PoolState;

/// Errors related to the pool itself, as opposed to a single invocation.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Pool exhausted: all {max_contexts} contexts busy and queue capacity ({queue_capacity}) reached")]
    Exhausted { max_contexts: usize, queue_capacity: usize },
    #[error("Pool is not accepting submissions (state: {state})")]
    NotAccepting { state: PoolState },
    #[error("Cannot {operation} a pool that is {state}")]
    InvalidState { operation: &'static str, state: PoolState },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Worker thread setup error: {0}")]
    ThreadSetup(String),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("Internal pool error: {0}")]
    Other(#[from] anyhow::Error),
}
