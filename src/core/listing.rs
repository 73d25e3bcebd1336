use crate::core::repr::cell_text;
use crate::domain::model::Row;
use indexmap::IndexSet;
use serde_json::Value;

/// The array stored under `field` in a listing response. A missing or
/// non-array field is treated as an empty listing.
pub fn array_field<'a>(body: &'a Value, field: &str) -> &'a [Value] {
    match body.get(field) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            tracing::warn!("⚠️ Field '{}' is not an array (got {})", field, type_name(other));
            &[]
        }
        None => {
            tracing::warn!("⚠️ Response has no '{}' field", field);
            &[]
        }
    }
}

/// One row per JSON object. Columns are the union of all keys in
/// first-seen order; absent and null cells become `missing`.
pub fn rows_from_objects(items: &[Value], missing: &str) -> Vec<Row> {
    let objects: Vec<_> = items.iter().filter_map(Value::as_object).collect();
    if objects.len() < items.len() {
        tracing::warn!(
            "⚠️ Ignoring {} non-object entries in listing",
            items.len() - objects.len()
        );
    }

    let columns: IndexSet<&str> = objects
        .iter()
        .flat_map(|obj| obj.keys().map(String::as_str))
        .collect();

    objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|&column| {
                    let text = obj
                        .get(column)
                        .map(|value| cell_text(value, missing))
                        .unwrap_or_else(|| missing.to_string());
                    (column, text)
                })
                .collect()
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_from_objects_unions_columns() {
        let body = json!({"data": [
            {"definitionId": 1, "name": "origin down", "lastTriggered": null},
            {"definitionId": 2, "name": "5xx", "lastTriggered": "2024-01-01", "fields": {"cpcode": 7}}
        ]});

        let rows = rows_from_objects(array_field(&body, "data"), "-");

        assert_eq!(rows.len(), 2);
        let columns: Vec<&str> = rows[0].columns().collect();
        assert_eq!(columns, vec!["definitionId", "name", "lastTriggered", "fields"]);
        assert_eq!(rows[0].get("lastTriggered"), Some("-"));
        assert_eq!(rows[0].get("fields"), Some("-"));
        assert_eq!(rows[1].get("definitionId"), Some("2"));
        assert_eq!(rows[1].get("fields"), Some("{'cpcode': 7}"));
    }

    #[test]
    fn test_array_field_missing_or_wrong_type() {
        assert!(array_field(&json!({}), "cpcodes").is_empty());
        assert!(array_field(&json!({"cpcodes": "nope"}), "cpcodes").is_empty());
        assert_eq!(array_field(&json!({"cpcodes": [1, 2]}), "cpcodes").len(), 2);
    }

    #[test]
    fn test_non_objects_are_ignored() {
        let rows = rows_from_objects(&[json!(1), json!({"a": "b"})], "");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some("b"));
    }
}
