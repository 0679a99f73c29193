//! # Script Error Types
//!
//! Errors produced while validating or executing a script, and errors raised by
//! handler code when it reads the state bag.
//!
//! ## Classification
//!
//! - `ScriptError`: anything that stops a single invocation from producing results.
//!   It is `Clone` so the pool can both hand it to an error handler and record it
//!   on the invocation handle.
//! - `StateBagError`: a handler expected an entry in its state bag and did not find
//!   it (or found the wrong type). This is a caller contract violation; the pool
//!   never raises or swallows it, handler code deals with it.
//!
//! ## Usage Example
//!
//! ```rust
//! use scriptpool_api::errors::ScriptError;
//!
//! fn describe(error: &ScriptError) -> &'static str {
//!     match error {
//!         ScriptError::InvalidScript(_) => "rejected before running",
//!         ScriptError::ExecutionFault(_) => "failed while running",
//!         _ => "other",
//!     }
//! }
//! ```

use thiserror::Error;

/// Failure of a single script invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The script text is empty or cannot be parsed.
    ///
    /// Surfaced directly by the synchronous path and routed to the error
    /// handler on the asynchronous path.
    #[error("Invalid script: {0}")]
    InvalidScript(String),

    /// The script was accepted but failed while running.
    #[error("Execution fault: {0}")]
    ExecutionFault(String),

    /// Two parameters with the same name were bound to one invocation.
    #[error("Duplicate parameter: {0}")]
    DuplicateParameter(String),

    /// The completion or error handler panicked.
    ///
    /// Only ever recorded on an invocation handle; the handler that panicked
    /// is not called again.
    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),
}

impl ScriptError {
    /// Shorthand for an [`ScriptError::ExecutionFault`].
    pub fn fault(message: impl Into<String>) -> Self {
        Self::ExecutionFault(message.into())
    }

    /// Shorthand for an [`ScriptError::InvalidScript`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidScript(message.into())
    }
}

// Engines and custom commands written against anyhow can use `?` directly;
// the chain is flattened because ScriptError has to stay Clone.
impl From<anyhow::Error> for ScriptError {
    fn from(error: anyhow::Error) -> Self {
        Self::ExecutionFault(format!("{error:#}"))
    }
}

/// A handler's expectation about its state bag was not met.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateBagError {
    #[error("State bag entry missing: {key}")]
    Missing { key: String },

    #[error("State bag entry {key} is not {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}
