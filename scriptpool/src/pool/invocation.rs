use std::fmt;

use scriptpool_api::{Parameters, ResultRecord, Script, ScriptError, StateBag, Value};

/// Called once with the results and the state bag of a successful invocation.
pub type CompletionHandler = Box<dyn FnOnce(Vec<ResultRecord>, StateBag) + Send + 'static>;

/// Called once with the fault and the state bag of a failed invocation.
pub type ErrorHandler = Box<dyn FnOnce(ScriptError, StateBag) + Send + 'static>;

/// One request to run a script on the pool.
///
/// ```rust
/// use scriptpool::Invocation;
/// use scriptpool_api::StateBag;
///
/// let invocation = Invocation::new("sleep $ms; echo \"$i | Slept: $ms ms\"")
///     .parameter("i", 1)
///     .and_then(|inv| inv.parameter("ms", 10))
///     .unwrap()
///     .with_state(StateBag::new().with("i", 1))
///     .on_complete(|results, state| {
///         println!("{} -> {:?}", state.require_i64("i").unwrap(), results);
///     });
/// assert_eq!(invocation.parameters().len(), 2);
/// ```
pub struct Invocation {
    script: Script,
    parameters: Parameters,
    state: StateBag,
    on_complete: Option<CompletionHandler>,
    on_error: Option<ErrorHandler>,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("script", &self.script)
            .field("parameters", &self.parameters)
            .field("state", &self.state)
            .field("has_on_complete", &self.on_complete.is_some())
            .field("has_on_error", &self.on_error.is_some())
            .finish()
    }
}

impl Invocation {
    pub fn new(script: impl Into<Script>) -> Self {
        Self {
            script: script.into(),
            parameters: Parameters::new(),
            state: StateBag::new(),
            on_complete: None,
            on_error: None,
        }
    }

    /// Replace the whole parameter set.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Bind one more parameter. Fails on a duplicate name.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self, ScriptError> {
        self.parameters.add(name, value)?;
        Ok(self)
    }

    pub fn with_state(mut self, state: StateBag) -> Self {
        self.state = state;
        self
    }

    pub fn on_complete<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(Vec<ResultRecord>, StateBag) + Send + 'static,
    {
        self.on_complete = Some(Box::new(handler));
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(ScriptError, StateBag) + Send + 'static,
    {
        self.on_error = Some(Box::new(handler));
        self
    }

    pub(crate) fn with_completion_handler(mut self, handler: Option<CompletionHandler>) -> Self {
        self.on_complete = handler;
        self
    }

    pub(crate) fn with_error_handler(mut self, handler: Option<ErrorHandler>) -> Self {
        self.on_error = handler;
        self
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn state(&self) -> &StateBag {
        &self.state
    }

    pub(crate) fn into_parts(self) -> InvocationParts {
        InvocationParts {
            script: self.script,
            parameters: self.parameters,
            state: self.state,
            on_complete: self.on_complete,
            on_error: self.on_error,
        }
    }
}

/// An invocation taken apart by the worker that runs it.
pub(crate) struct InvocationParts {
    pub script: Script,
    pub parameters: Parameters,
    pub state: StateBag,
    pub on_complete: Option<CompletionHandler>,
    pub on_error: Option<ErrorHandler>,
}
