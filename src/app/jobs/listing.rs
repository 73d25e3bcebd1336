use crate::core::listing::{array_field, rows_from_objects};
use crate::core::pipeline::BatchJob;
use crate::domain::model::{OutputTarget, Row, Selection};
use crate::domain::ports::{ApiClient, QueryParams};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const ALERT_SUMMARIES_PATH: &str = "/alerts/v2/alert-summaries";
pub const CPCODES_PATH: &str = "/cprg/v1/cpcodes";

/// Flattens one listing call into a CSV file. Every returned object
/// becomes a row; nothing is fetched per row.
pub struct ListingJob<C: ApiClient> {
    name: &'static str,
    client: C,
    path: &'static str,
    field: &'static str,
    missing: &'static str,
    params: QueryParams,
    output: String,
}

impl<C: ApiClient> ListingJob<C> {
    /// Alert summaries; null cells become `-` so later runs can spot
    /// alerts that never triggered.
    pub fn alerts(client: C, params: QueryParams, output: impl Into<String>) -> Self {
        Self {
            name: "alerts-list",
            client,
            path: ALERT_SUMMARIES_PATH,
            field: "data",
            missing: "-",
            params,
            output: output.into(),
        }
    }

    pub fn cpcodes(client: C, params: QueryParams, output: impl Into<String>) -> Self {
        Self {
            name: "cpcodes",
            client,
            path: CPCODES_PATH,
            field: "cpcodes",
            missing: "",
            params,
            output: output.into(),
        }
    }
}

#[async_trait]
impl<C: ApiClient> BatchJob for ListingJob<C> {
    fn name(&self) -> &str {
        self.name
    }

    async fn load_input(&self) -> Result<Vec<Row>> {
        let body = self.client.get_json(self.path, &self.params).await?;
        let items = array_field(&body, self.field);
        tracing::info!("📋 {}: {} entries in '{}'", self.name, items.len(), self.field);
        Ok(rows_from_objects(items, self.missing))
    }

    fn select(&self, _row: &Row) -> Selection {
        Selection::PassThrough
    }

    fn output(&self) -> OutputTarget {
        OutputTarget::overwrite(self.output.clone())
    }
}
