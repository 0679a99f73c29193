//! Built-in commands of the command engine.

use std::thread;
use std::time::Duration;

use scriptpool_api::{ResultRecord, ScriptError, Value};

use super::{Argument, CommandEngine, CommandScope};

pub(super) fn register_builtins(engine: &mut CommandEngine) {
    engine
        .register("echo", echo)
        .register("emit", emit)
        .register("sleep", sleep)
        .register("set", set)
        .register("fail", fail)
        .register("context", context);
}

fn echo(args: &[Argument], _scope: &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> {
    Ok(args
        .iter()
        .map(|arg| match &arg.name {
            Some(name) => ResultRecord::new().with_field(name.clone(), arg.value.clone()),
            None => ResultRecord::from_value(arg.value.clone()),
        })
        .collect())
}

fn emit(args: &[Argument], _scope: &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> {
    let mut record = ResultRecord::new();
    for arg in args {
        let name = arg
            .name
            .as_ref()
            .ok_or_else(|| ScriptError::fault(format!("expected key=value, got '{}'", arg.value)))?;
        record.set(name.clone(), arg.value.clone());
    }
    Ok(vec![record])
}

fn sleep(args: &[Argument], _scope: &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> {
    let [arg] = args else {
        return Err(ScriptError::fault("expected exactly one argument (milliseconds)"));
    };
    let ms = arg
        .value
        .as_i64()
        .and_then(|ms| u64::try_from(ms).ok())
        .ok_or_else(|| ScriptError::fault(format!("'{}' is not a non-negative number of milliseconds", arg.value)))?;
    thread::sleep(Duration::from_millis(ms));
    Ok(Vec::new())
}

fn set(args: &[Argument], scope: &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> {
    match args {
        [target, value] if target.name.is_none() => {
            let Value::Text(name) = &target.value else {
                return Err(ScriptError::fault(format!("'{}' is not a variable name", target.value)));
            };
            scope.set_local(name.clone(), value.value.clone());
            Ok(Vec::new())
        }
        [pair] if pair.name.is_some() => {
            let name = pair.name.clone().unwrap_or_default();
            scope.set_local(name, pair.value.clone());
            Ok(Vec::new())
        }
        _ => Err(ScriptError::fault("expected 'set name value' or 'set name=value'")),
    }
}

fn fail(args: &[Argument], _scope: &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> {
    let message = args.iter().map(|a| a.value.to_string()).collect::<Vec<_>>().join(" ");
    Err(ScriptError::ExecutionFault(if message.is_empty() {
        "script failed".to_string()
    } else {
        message
    }))
}

fn context(_args: &[Argument], scope: &mut CommandScope<'_>) -> Result<Vec<ResultRecord>, ScriptError> {
    let context = scope.context();
    Ok(vec![ResultRecord::new()
        .with_field("context_id", context.id().0)
        .with_field("invocations", context.invocations())])
}
