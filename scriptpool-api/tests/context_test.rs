use scriptpool_api::{ContextId, ExecutionContext, Parameters, ResultRecord, Script, ScriptEngine, ScriptError, Value};

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes a parameter and counts runs in a session variable.
    #[derive(Debug)]
    struct CountingEngine;

    impl ScriptEngine for CountingEngine {
        fn execute(
            &self,
            script: &Script,
            parameters: &Parameters,
            context: &mut ExecutionContext,
        ) -> Result<Vec<ResultRecord>, ScriptError> {
            let runs = context.variable("runs").and_then(Value::as_i64).unwrap_or(0) + 1;
            context.set_variable("runs", runs);
            let name = parameters
                .get("name")
                .ok_or_else(|| ScriptError::fault(format!("{script}: name not bound")))?;
            Ok(vec![ResultRecord::new().with_field("name", name.clone()).with_field("runs", runs)])
        }
    }

    #[test]
    fn test_context_identity() {
        let context = ExecutionContext::new(4);
        assert_eq!(context.id(), ContextId(4));
        assert_eq!(context.id().to_string(), "context-4");
        assert_eq!(context.invocations(), 0);
    }

    #[test]
    fn test_session_variables_persist_across_runs() {
        let engine = CountingEngine;
        let mut context = ExecutionContext::new(0);
        let script = Script::new("count");

        let first = engine
            .execute(&script, &Parameters::new().with("name", "a").unwrap(), &mut context)
            .unwrap();
        let second = engine
            .execute(&script, &Parameters::new().with("name", "b").unwrap(), &mut context)
            .unwrap();

        assert_eq!(first[0].get("name"), Some(&Value::from("a")));
        assert_eq!(second[0].get("name"), Some(&Value::from("b")));
        assert_eq!(second[0].get("runs"), Some(&Value::Int(2)));
        // Parameters are not copied into the session.
        assert!(context.variable("name").is_none());
    }

    #[test]
    fn test_default_validation_rejects_blank_text() {
        let engine = CountingEngine;
        assert!(matches!(engine.validate(&Script::new(" \n\t")), Err(ScriptError::InvalidScript(_))));
        assert!(engine.validate(&Script::new("count")).is_ok());
    }

    #[test]
    fn test_variables_round_trip() {
        let mut context = ExecutionContext::with_variables(1, [("env", "prod")]);
        assert_eq!(context.variable("env"), Some(&Value::from("prod")));
        assert_eq!(context.set_variable("env", "dev"), Some(Value::from("prod")));
        assert_eq!(context.remove_variable("env"), Some(Value::from("dev")));
        assert_eq!(context.variables().count(), 0);
        context.begin_invocation();
        assert_eq!(context.invocations(), 1);
    }

    #[test]
    fn test_script_text_shared() {
        let script = Script::from("echo hi");
        let copy = script.clone();
        assert_eq!(copy.text(), "echo hi");
        assert_eq!(script, copy);
        assert!(!script.is_blank());
    }
}
