//! # Script Engine
//!
//! The seam between the pool and whatever actually interprets script text.
//! The pool treats an engine as a black box:
//! `execute(text, parameters, context) -> results | fault`.
//!
//! ## Contract
//!
//! - `validate` is cheap and side-effect free. The default rejects blank text.
//! - `execute` runs on whichever thread calls it: the caller's thread on the
//!   synchronous path, a pool worker on the asynchronous path. It must not
//!   assume thread affinity.
//! - `execute` binds parameters into its own per-invocation scope and must not
//!   copy them into the context's session variables.
//! - A fault is returned as `Err`. A panic is caught by the caller and treated
//!   as an [`ScriptError::ExecutionFault`], but engines should not rely on it.

use std::fmt::Debug;

use crate::context::ExecutionContext;
use crate::errors::ScriptError;
use crate::parameters::Parameters;
use crate::record::ResultRecord;
use crate::script::Script;

/// Executor for script text.
pub trait ScriptEngine: Send + Sync + Debug {
    /// Check the script before it is scheduled.
    fn validate(&self, script: &Script) -> Result<(), ScriptError> {
        if script.is_blank() {
            return Err(ScriptError::invalid("script text is empty"));
        }
        Ok(())
    }

    /// Run the script to completion on `context`.
    fn execute(
        &self,
        script: &Script,
        parameters: &Parameters,
        context: &mut ExecutionContext,
    ) -> Result<Vec<ResultRecord>, ScriptError>;
}
