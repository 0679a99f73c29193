//! # Command Engine
//!
//! A small [`ScriptEngine`] whose scripts are sequences of registered commands.
//! It is not a language: there is no control flow and no expressions, only
//! commands with arguments and `$name` variable references. It exists so the
//! pool can be driven end to end without an external interpreter.
//!
//! ## Variables
//! Lookup order for `$name`: invocation locals (set with `set`), then bound
//! parameters, then the context's session variables. An unknown name faults
//! the invocation.
//!
//! ## Built-in commands
//! | Command | Effect |
//! |---------|--------|
//! | `echo args…` | one record per argument, field `value` |
//! | `emit k=v …` | one record with the given fields, in order |
//! | `sleep ms` | blocks the context's thread for `ms` milliseconds |
//! | `set name value` | invocation-local variable |
//! | `fail message…` | faults the invocation |
//! | `context` | record with `context_id` and `invocations` |
//!
//! Custom commands are plain closures:
//!
//! ```rust
//! use scriptpool::CommandEngine;
//! use scriptpool_api::{ResultRecord, ScriptError};
//!
//! let engine = CommandEngine::new().with_command("double", |args, _scope| {
//!     let n = args
//!         .first()
//!         .and_then(|a| a.value.as_i64())
//!         .ok_or_else(|| ScriptError::fault("double expects a number"))?;
//!     Ok(vec![ResultRecord::from_value(n * 2)])
//! });
//! assert!(engine.has_command("double"));
//! ```

mod commands;
pub mod parser;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use scriptpool_api::{ExecutionContext, Parameters, ResultRecord, Script, ScriptEngine, ScriptError, Value};
use tracing::trace;

use self::parser::{Segment, Statement, Token};

/// An evaluated argument; `name` is set for `key=value` arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Value,
}

/// Signature of a command implementation.
pub type Command =
    Arc<dyn Fn(&[Argument], &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> + Send + Sync>;

/// Variables visible to one running invocation.
pub struct CommandScope<'a> {
    context: &'a mut ExecutionContext,
    parameters: &'a Parameters,
    locals: BTreeMap<String, Value>,
}

impl<'a> CommandScope<'a> {
    fn new(context: &'a mut ExecutionContext, parameters: &'a Parameters) -> Self {
        Self {
            context,
            parameters,
            locals: BTreeMap::new(),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.locals
            .get(name)
            .or_else(|| self.parameters.get(name))
            .or_else(|| self.context.variable(name))
    }

    /// Set an invocation-local variable; it disappears when the script ends.
    pub fn set_local(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.locals.insert(name.into(), value.into());
    }

    pub fn parameters(&self) -> &Parameters {
        self.parameters
    }

    pub fn context(&self) -> &ExecutionContext {
        &*self.context
    }

    /// Session state that outlives the invocation. Commands that write here
    /// affect later invocations on the same context.
    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut *self.context
    }

    fn resolve(&self, name: &str, line: usize) -> Result<Value, ScriptError> {
        self.variable(name)
            .cloned()
            .ok_or_else(|| ScriptError::fault(format!("line {line}: variable ${name} is not defined")))
    }

    fn evaluate(&self, token: &Token, line: usize) -> Result<Argument, ScriptError> {
        let value = match token {
            Token::Word(word) => literal(word),
            Token::Variable(name) => self.resolve(name, line)?,
            Token::Quoted(segments) => {
                let mut text = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(s) => text.push_str(s),
                        Segment::Variable(name) => text.push_str(&self.resolve(name, line)?.to_string()),
                    }
                }
                Value::Text(text)
            }
            Token::Pair(name, value) => {
                return Ok(Argument {
                    name: Some(name.clone()),
                    value: self.evaluate(value, line)?.value,
                })
            }
        };
        Ok(Argument { name: None, value })
    }
}

fn literal(word: &str) -> Value {
    match word {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            // "nan" and "inf" stay text.
            if !word.bytes().any(|b| b.is_ascii_digit()) {
                return Value::Text(word.to_string());
            }
            if let Ok(i) = word.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(x) = word.parse::<f64>() {
                Value::Float(x)
            } else {
                Value::Text(word.to_string())
            }
        }
    }
}

/// Script engine dispatching statements to registered commands.
#[derive(Clone)]
pub struct CommandEngine {
    commands: HashMap<String, Command>,
}

impl fmt::Debug for CommandEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.commands.keys().collect();
        names.sort();
        f.debug_struct("CommandEngine").field("commands", &names).finish()
    }
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandEngine {
    /// Engine with the built-in commands registered.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        commands::register_builtins(&mut engine);
        engine
    }

    /// Engine with no commands at all.
    pub fn empty() -> Self {
        Self { commands: HashMap::new() }
    }

    /// Register (or replace) a command. Names are case-insensitive.
    pub fn register<F>(&mut self, name: &str, command: F) -> &mut Self
    where
        F: Fn(&[Argument], &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> + Send + Sync + 'static,
    {
        self.commands.insert(name.to_ascii_lowercase(), Arc::new(command));
        self
    }

    /// Builder form of [`CommandEngine::register`].
    pub fn with_command<F>(mut self, name: &str, command: F) -> Self
    where
        F: Fn(&[Argument], &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> + Send + Sync + 'static,
    {
        self.register(name, command);
        self
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_ascii_lowercase())
    }

    fn run_statement(
        &self,
        statement: &Statement,
        scope: &mut CommandScope<'_>,
    ) -> Result<Vec<ResultRecord>, ScriptError> {
        let command = self.commands.get(&statement.command).ok_or_else(|| {
            ScriptError::fault(format!(
                "line {}: unknown command '{}'",
                statement.line, statement.command
            ))
        })?;
        let args = statement
            .args
            .iter()
            .map(|token| scope.evaluate(token, statement.line))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(command = %statement.command, line = statement.line, args = args.len(), "running statement");
        command(&args, scope).map_err(|e| match e {
            ScriptError::ExecutionFault(message) => {
                ScriptError::ExecutionFault(format!("line {}: {}: {}", statement.line, statement.command, message))
            }
            other => other,
        })
    }
}

impl ScriptEngine for CommandEngine {
    fn validate(&self, script: &Script) -> Result<(), ScriptError> {
        if parser::parse(script.text())?.is_empty() {
            return Err(ScriptError::invalid("script contains no statements"));
        }
        Ok(())
    }

    fn execute(
        &self,
        script: &Script,
        parameters: &Parameters,
        context: &mut ExecutionContext,
    ) -> Result<Vec<ResultRecord>, ScriptError> {
        let statements = parser::parse(script.text())?;
        let mut scope = CommandScope::new(context, parameters);
        let mut results = Vec::new();
        for statement in &statements {
            results.extend(self.run_statement(statement, &mut scope)?);
        }
        Ok(results)
    }
}
