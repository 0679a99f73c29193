use scriptpool_api::{StateBag, StateBagError, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let bag = StateBag::new().with("i", 3).with("label", "third");
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("i"), Some(&Value::Int(3)));
        assert!(bag.contains_key("label"));
    }

    #[test]
    fn test_require_reports_missing_entry() {
        let bag = StateBag::new();
        assert_eq!(bag.require("i"), Err(StateBagError::Missing { key: "i".to_string() }));
        assert!(bag.is_empty());
    }

    #[test]
    fn test_typed_require() {
        let bag = StateBag::new().with("i", 3).with("label", "third").with("numeric_text", "42");
        assert_eq!(bag.require_i64("i"), Ok(3));
        assert_eq!(bag.require_str("label"), Ok("third"));
        assert_eq!(bag.require_i64("numeric_text"), Ok(42));
        assert_eq!(
            bag.require_i64("label"),
            Err(StateBagError::TypeMismatch { key: "label".to_string(), expected: "int" })
        );
        assert_eq!(
            bag.require_str("i"),
            Err(StateBagError::TypeMismatch { key: "i".to_string(), expected: "text" })
        );
    }

    #[test]
    fn test_insert_returns_previous() {
        let mut bag = StateBag::new();
        assert_eq!(bag.insert("k", 1), None);
        assert_eq!(bag.insert("k", 2), Some(Value::Int(1)));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = StateBag::new().with("x", 1).with("y", 2);
        let b: StateBag = vec![("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(StateBag::new(), StateBag::default());
    }
}
