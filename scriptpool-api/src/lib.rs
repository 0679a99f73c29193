//! # Scriptpool API
//!
//! Scriptpool runs independent script invocations on a bounded pool of isolated
//! execution contexts ("runspaces") and hands every invocation's output, together
//! with caller-defined metadata, to a completion handler.
//!
//! This crate holds the abstract model shared by the pool implementation and by
//! script engines:
//!
//! - **Values**: the dynamically typed [`Value`] used for parameters, state bags,
//!   session variables and result fields
//! - **Results**: [`ResultRecord`], an ordered set of named fields produced by a script
//! - **Inputs**: [`Script`] text and ordered, uniquely named [`Parameters`]
//! - **Metadata**: the [`StateBag`] round-tripped verbatim to handlers
//! - **Contexts**: [`ExecutionContext`], one unit of execution capacity
//! - **Engines**: the [`ScriptEngine`] trait, the seam to whatever actually runs scripts
//! - **Errors**: [`ScriptError`] and [`StateBagError`]
//!
//! ## Usage Example
//!
//! ```rust
//! use scriptpool_api::{ExecutionContext, Parameters, ResultRecord, Script, ScriptEngine, ScriptError};
//!
//! #[derive(Debug)]
//! struct Upper;
//!
//! impl ScriptEngine for Upper {
//!     fn execute(
//!         &self,
//!         script: &Script,
//!         _parameters: &Parameters,
//!         _context: &mut ExecutionContext,
//!     ) -> Result<Vec<ResultRecord>, ScriptError> {
//!         Ok(vec![ResultRecord::from_value(script.text().to_uppercase())])
//!     }
//! }
//!
//! let mut context = ExecutionContext::new(0);
//! let results = Upper
//!     .execute(&Script::new("hello"), &Parameters::new(), &mut context)
//!     .unwrap();
//! assert_eq!(results[0].value().and_then(|v| v.as_str()), Some("HELLO"));
//! ```

pub mod context;
pub mod engine;
pub mod errors;
pub mod parameters;
pub mod record;
pub mod script;
pub mod state;
pub mod value;

pub use context::{ContextId, ExecutionContext};
pub use engine::ScriptEngine;
pub use errors::{ScriptError, StateBagError};
pub use parameters::Parameters;
pub use record::ResultRecord;
pub use script::Script;
pub use state::StateBag;
pub use value::Value;
