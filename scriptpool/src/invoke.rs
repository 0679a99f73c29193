//! # Execution Paths
//!
//! The two ways to run a script:
//!
//! - [`run_synchronously`] runs on the calling thread against a context the
//!   caller owns, blocking until the script finishes. No pool is involved.
//! - [`run_asynchronously`] submits to a [`RunspacePool`] and returns at once
//!   with an [`InvocationHandle`]; handlers run later on a pool worker.
//!
//! Both go through the same guarded execution step: validate, count the
//! invocation on the context, run the engine with panics converted into
//! `ExecutionFault`s. The context is reusable afterwards whatever the outcome.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use scriptpool_api::{ExecutionContext, Parameters, ResultRecord, Script, ScriptEngine, ScriptError, StateBag};

use crate::pool::{CompletionHandler, ErrorHandler, Invocation, InvocationHandle, PoolError, RunspacePool};

/// Run `script` to completion on the calling thread.
///
/// Faults are returned as `Err`; they never unwind into the caller, even when
/// the engine panics.
///
/// ```rust
/// use scriptpool::{run_synchronously, CommandEngine};
/// use scriptpool_api::{ExecutionContext, Parameters, Script};
///
/// let engine = CommandEngine::new();
/// let mut context = ExecutionContext::new(0);
/// let params = Parameters::new().with("name", "world").unwrap();
/// let results = run_synchronously(&engine, &Script::new("echo \"hello $name\""), &params, &mut context).unwrap();
/// assert_eq!(results[0].to_string(), "hello world");
/// ```
pub fn run_synchronously(
    engine: &dyn ScriptEngine,
    script: &Script,
    parameters: &Parameters,
    context: &mut ExecutionContext,
) -> Result<Vec<ResultRecord>, ScriptError> {
    execute_guarded(engine, script, parameters, context)
}

/// Submit `script` to `pool` with optional handlers, a state bag and parameters.
///
/// Equivalent to building an [`Invocation`] and calling
/// [`RunspacePool::submit`]. Without `on_error` a fault is logged and recorded
/// on the returned handle; without `on_complete` the results are dropped and
/// only the handle reports the outcome.
///
/// ```rust
/// use std::sync::Arc;
/// use scriptpool::{run_asynchronously, CommandEngine, InvocationStatus, PoolConfig, RunspacePool};
/// use scriptpool_api::{Parameters, ResultRecord, StateBag};
///
/// let pool = RunspacePool::open_with(PoolConfig::new(1, 1), Arc::new(CommandEngine::new())).unwrap();
/// let handle = run_asynchronously(
///     "echo $n",
///     &pool,
///     Some(Box::new(|results: Vec<ResultRecord>, _state: StateBag| assert_eq!(results[0].to_string(), "3"))),
///     None,
///     StateBag::new(),
///     Parameters::new().with("n", 3).unwrap(),
/// )
/// .unwrap();
/// assert_eq!(handle.wait(), InvocationStatus::Completed);
/// ```
pub fn run_asynchronously(
    script: impl Into<Script>,
    pool: &RunspacePool,
    on_complete: Option<CompletionHandler>,
    on_error: Option<ErrorHandler>,
    state: StateBag,
    parameters: Parameters,
) -> Result<InvocationHandle, PoolError> {
    let invocation = Invocation::new(script)
        .with_parameters(parameters)
        .with_state(state)
        .with_completion_handler(on_complete)
        .with_error_handler(on_error);
    pool.submit(invocation)
}

pub(crate) fn execute_guarded(
    engine: &dyn ScriptEngine,
    script: &Script,
    parameters: &Parameters,
    context: &mut ExecutionContext,
) -> Result<Vec<ResultRecord>, ScriptError> {
    engine.validate(script)?;
    context.begin_invocation();
    match panic::catch_unwind(AssertUnwindSafe(|| engine.execute(script, parameters, context))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(ScriptError::ExecutionFault(format!(
            "engine panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Panicking;

    impl ScriptEngine for Panicking {
        fn execute(
            &self,
            _script: &Script,
            _parameters: &Parameters,
            _context: &mut ExecutionContext,
        ) -> Result<Vec<ResultRecord>, ScriptError> {
            panic!("engine blew up")
        }
    }

    #[test]
    fn test_engine_panic_becomes_fault() {
        let mut context = ExecutionContext::new(0);
        let err = run_synchronously(&Panicking, &Script::new("anything"), &Parameters::new(), &mut context)
            .unwrap_err();
        assert_eq!(err, ScriptError::fault("engine panicked: engine blew up"));
        assert_eq!(context.invocations(), 1);
    }

    #[test]
    fn test_blank_script_is_invalid_and_not_counted() {
        let mut context = ExecutionContext::new(0);
        let err = run_synchronously(&Panicking, &Script::new("   "), &Parameters::new(), &mut context)
            .unwrap_err();
        assert!(matches!(err, ScriptError::InvalidScript(_)));
        assert_eq!(context.invocations(), 0);
    }

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
