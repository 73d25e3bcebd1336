use crate::core::repr::cell_text;
use crate::domain::model::Row;
use serde_json::Value;

/// Prefix for columns merged in from an alert definition.
pub const DEFINITION_PREFIX: &str = "definition_";

/// Key of the detail payload section that gets flattened into the row.
pub const DEFINITION_SECTION: &str = "definition";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub row: Row,
    /// False when the payload had no detail section; `row` is then the base row.
    pub detail_found: bool,
}

/// Flattens `payload.definition` into a copy of `base`, one `{prefix}{key}`
/// column per field.
pub fn enrich(base: &Row, payload: &Value, prefix: &str) -> Enrichment {
    enrich_section(base, payload, DEFINITION_SECTION, prefix)
}

pub fn enrich_section(base: &Row, payload: &Value, section: &str, prefix: &str) -> Enrichment {
    let mut row = base.clone();
    let Some(detail) = payload.get(section).and_then(Value::as_object) else {
        return Enrichment {
            row,
            detail_found: false,
        };
    };

    for (key, value) in detail {
        row.insert(format!("{}{}", prefix, key), cell_text(value, ""));
    }

    Enrichment {
        row,
        detail_found: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_row() -> Row {
        [("definitionId", "456"), ("lastTriggered", "2024-01-01")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_enrich_flattens_definition() {
        let payload = json!({"definition": {"name": "X", "tags": ["a", "b"], "enabled": true, "threshold": 5}});

        let result = enrich(&base_row(), &payload, DEFINITION_PREFIX);

        assert!(result.detail_found);
        assert_eq!(result.row.get("definitionId"), Some("456"));
        assert_eq!(result.row.get("definition_name"), Some("X"));
        assert_eq!(result.row.get("definition_tags"), Some("['a', 'b']"));
        assert_eq!(result.row.get("definition_enabled"), Some("True"));
        assert_eq!(result.row.get("definition_threshold"), Some("5"));
        let columns: Vec<&str> = result.row.columns().collect();
        assert_eq!(
            columns,
            vec![
                "definitionId",
                "lastTriggered",
                "definition_name",
                "definition_tags",
                "definition_enabled",
                "definition_threshold"
            ]
        );
    }

    #[test]
    fn test_enrich_without_definition_returns_base() {
        let base = base_row();
        let result = enrich(&base, &json!({"alerts": []}), DEFINITION_PREFIX);

        assert!(!result.detail_found);
        assert_eq!(result.row, base);

        let null_definition = enrich(&base, &json!({"definition": null}), DEFINITION_PREFIX);
        assert!(!null_definition.detail_found);
    }

    #[test]
    fn test_enrich_does_not_mutate_base() {
        let base = base_row();
        let _ = enrich(&base, &json!({"definition": {"name": "X"}}), DEFINITION_PREFIX);
        assert_eq!(base.len(), 2);
    }
}
