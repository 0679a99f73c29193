// Scriptpool: runspace pool implementation
//
// Runs script invocations concurrently on a bounded set of isolated execution
// contexts and reports each invocation to a completion or error handler plus a
// waitable handle. The abstract model (values, records, contexts, the engine
// trait) lives in `scriptpool-api`.

pub mod engine;
pub mod invoke;
pub mod logging;
pub mod pool;

pub use engine::{Argument, CommandEngine, CommandScope};
pub use invoke::{run_asynchronously, run_synchronously};
pub use pool::{
    wait_all, wait_all_async, wait_all_timeout, CompletionHandler, ErrorHandler, ExhaustionStrategy, Invocation,
    InvocationHandle, InvocationId, InvocationStatus, PoolConfig, PoolError, PoolMetrics, PoolState, RunspacePool,
};

// Re-export the API crate so callers need a single dependency.
pub use scriptpool_api as api;
