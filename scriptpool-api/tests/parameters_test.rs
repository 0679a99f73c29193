use scriptpool_api::{Parameters, ScriptError, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_preserved() {
        let params = Parameters::new()
            .with("z", 1)
            .and_then(|p| p.with("a", 2))
            .and_then(|p| p.with("m", 3))
            .unwrap();
        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert_eq!(params.get("a"), Some(&Value::Int(2)));
        assert_eq!(params.len(), 3);
        assert!(!params.is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut params = Parameters::new();
        params.add("ms", 10).unwrap();
        let err = params.add("ms", 20).unwrap_err();
        assert_eq!(err, ScriptError::DuplicateParameter("ms".to_string()));
        // The original binding survives.
        assert_eq!(params.get("ms"), Some(&Value::Int(10)));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let params = Parameters::new().with("Name", "a").and_then(|p| p.with("name", "b")).unwrap();
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(Parameters::new().with("", 1), Err(ScriptError::InvalidScript(_))));
    }

    #[test]
    fn test_try_from_pairs() {
        let params = Parameters::try_from_pairs([("i", Value::from(1)), ("ms", Value::from(250))]).unwrap();
        assert_eq!(params.iter().count(), 2);

        let err = Parameters::try_from_pairs([("i", 1), ("i", 2)]).unwrap_err();
        assert_eq!(err, ScriptError::DuplicateParameter("i".to_string()));
    }

    #[test]
    fn test_missing_parameter() {
        let params = Parameters::new();
        assert!(params.get("anything").is_none());
        assert!(!params.contains("anything"));
        assert!(params.is_empty());
    }
}
