use crate::app::jobs::{api_path, InputFile};
use crate::app::jobs::listing::ALERT_SUMMARIES_PATH;
use crate::core::enricher::{enrich, DEFINITION_PREFIX};
use crate::core::pipeline::BatchJob;
use crate::domain::model::{OutputTarget, Row, Selection};
use crate::domain::ports::{ApiClient, QueryParams, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Value `alerts-list` writes for an alert that never fired.
pub const NEVER_TRIGGERED: &str = "-";

/// Adds the definition of every triggered alert to its summary row.
pub struct AlertDetailsJob<C: ApiClient, S: Storage> {
    client: C,
    storage: S,
    params: QueryParams,
    input: InputFile,
    output: String,
}

impl<C: ApiClient, S: Storage> AlertDetailsJob<C, S> {
    pub fn new(
        client: C,
        storage: S,
        params: QueryParams,
        input: impl Into<InputFile>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            client,
            storage,
            params,
            input: input.into(),
            output: output.into(),
        }
    }
}

#[async_trait]
impl<C: ApiClient, S: Storage> BatchJob for AlertDetailsJob<C, S> {
    fn name(&self) -> &str {
        "alerts-details"
    }

    async fn load_input(&self) -> Result<Vec<Row>> {
        self.input.load(&self.storage).await
    }

    fn select(&self, row: &Row) -> Selection {
        match row.get("lastTriggered").map(str::trim) {
            None | Some(NEVER_TRIGGERED) => Selection::Skip,
            Some(_) if row.get_trimmed("definitionId").unwrap_or_default().is_empty() => {
                tracing::warn!("⚠️ alerts-details: triggered alert without definitionId, skipping");
                Selection::Skip
            }
            Some(_) => Selection::Fetch,
        }
    }

    fn identifier(&self, row: &Row) -> String {
        row.get_trimmed("definitionId").unwrap_or_default().to_string()
    }

    async fn fetch(&self, row: &Row) -> Result<Value> {
        let definition_id = self.identifier(row);
        let path = api_path(ALERT_SUMMARIES_PATH, &[definition_id.as_str(), "details"])?;
        self.client.get_json(&path, &self.params).await
    }

    fn merge(&self, row: &Row, detail: Value) -> Option<Row> {
        let enrichment = enrich(row, &detail, DEFINITION_PREFIX);
        if !enrichment.detail_found {
            tracing::warn!(
                "⚠️ alerts-details: no definition for alert '{}', dropping row",
                self.identifier(row)
            );
            return None;
        }
        Some(enrichment.row)
    }

    fn output(&self) -> OutputTarget {
        OutputTarget::create_or_append(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{WriteMode, WriteOutcome};
    use crate::utils::error::EtlError;
    use serde_json::json;

    struct NoClient;

    #[async_trait]
    impl ApiClient for NoClient {
        async fn get_json(&self, path: &str, _params: &[(String, String)]) -> Result<Value> {
            Err(EtlError::ProcessingError {
                message: format!("unexpected request to {}", path),
            })
        }
    }

    struct NoStorage;

    impl Storage for NoStorage {
        async fn read_rows(&self, path: &str) -> Result<Vec<Row>> {
            Err(EtlError::FileNotFoundError {
                path: path.to_string(),
            })
        }

        async fn write_rows(&self, path: &str, _rows: &[Row], _mode: WriteMode) -> Result<WriteOutcome> {
            Err(EtlError::FileNotFoundError {
                path: path.to_string(),
            })
        }

        async fn remove_file(&self, _path: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn job() -> AlertDetailsJob<NoClient, NoStorage> {
        AlertDetailsJob::new(NoClient, NoStorage, Vec::new(), "a.csv", "b.csv")
    }

    fn alert(id: &str, last: &str) -> Row {
        [("definitionId", id), ("lastTriggered", last)].into_iter().collect()
    }

    #[test]
    fn test_select_skips_never_triggered() {
        let job = job();
        assert_eq!(job.select(&alert("123", "-")), Selection::Skip);
        assert_eq!(job.select(&alert("123", " - ")), Selection::Skip);
        assert_eq!(job.select(&alert("", "2024-01-01")), Selection::Skip);
        assert_eq!(job.select(&alert("456", "2024-01-01")), Selection::Fetch);
        assert_eq!(job.select(&alert("789", "")), Selection::Fetch);
        assert_eq!(job.select(&alert("789", "   ")), Selection::Fetch);

        let no_column: Row = [("definitionId", "1")].into_iter().collect();
        assert_eq!(job.select(&no_column), Selection::Skip);
    }

    #[test]
    fn test_merge_prefixes_definition_fields() {
        let job = job();
        let merged = job
            .merge(
                &alert("456", "2024-01-01"),
                json!({"definition": {"name": "X", "tags": ["a", "b"]}}),
            )
            .unwrap();

        assert_eq!(merged.get("definitionId"), Some("456"));
        assert_eq!(merged.get("definition_name"), Some("X"));
        assert_eq!(merged.get("definition_tags"), Some("['a', 'b']"));
    }

    #[test]
    fn test_merge_without_definition_drops_row() {
        let job = job();
        assert!(job.merge(&alert("456", "x"), json!({"id": 456})).is_none());
    }

    #[test]
    fn test_output_appends() {
        assert_eq!(job().output(), OutputTarget::create_or_append("b.csv"));
    }
}
