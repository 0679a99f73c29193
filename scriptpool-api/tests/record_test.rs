use scriptpool_api::{ResultRecord, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_by_name_in_order() {
        let record = ResultRecord::new()
            .with_field("SamAccountName", "jdoe")
            .with_field("Enabled", true)
            .with_field("LogonCount", 17);
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["SamAccountName", "Enabled", "LogonCount"]);
        assert_eq!(record.get("Enabled"), Some(&Value::Bool(true)));
        assert_eq!(record.get("Missing"), None);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut record = ResultRecord::new().with_field("a", 1).with_field("b", 2);
        record.set("a", 10);
        let fields: Vec<(&str, &Value)> = record.iter().collect();
        assert_eq!(fields, vec![("a", &Value::Int(10)), ("b", &Value::Int(2))]);
    }

    #[test]
    fn test_single_value_record() {
        let record = ResultRecord::from_value("3 | Slept: 120 ms");
        assert_eq!(record.value(), Some(&Value::from("3 | Slept: 120 ms")));
        assert_eq!(record.to_string(), "3 | Slept: 120 ms");
    }

    #[test]
    fn test_display_multi_field() {
        let record: ResultRecord = vec![("name", Value::from("build")), ("ok", Value::from(true))]
            .into_iter()
            .collect();
        assert_eq!(record.to_string(), "@{name=build; ok=true}");
        assert_eq!(ResultRecord::new().to_string(), "@{}");
        assert!(ResultRecord::new().is_empty());
    }

    #[test]
    fn test_value_views() {
        assert_eq!(Value::from("12").as_i64(), Some(12));
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::Float(1.5).as_i64(), None);
        assert_eq!(Value::from(vec![1, 2]).as_list().map(<[Value]>::len), Some(2));
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "a b");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(false).type_name(), "bool");
    }
}
