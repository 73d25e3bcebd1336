use crate::app::jobs::InputFile;
use crate::core::pipeline::BatchJob;
use crate::core::traffic::{calculate_averages, has_report_data, summary_row, ReportWindow};
use crate::domain::model::{OutputTarget, Row, Selection};
use crate::domain::ports::{ApiClient, QueryParams, Storage};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde_json::Value;

pub const HITS_BY_CPCODE_PATH: &str =
    "/reporting-api/v1/reports/hits-by-cpcode/versions/1/report-data";
pub const TRAFFIC_METRICS: &str = "edgeHits,hitsOffload";
pub const DELIVERY_FILTERS: &str =
    "delivery_type=secure,delivery_type=non_secure,ip_version=ipv4,ip_version=ipv6";

/// Average edge hits and offload per CP code over a fixed window.
pub struct TrafficJob<C: ApiClient, S: Storage> {
    client: C,
    storage: S,
    params: QueryParams,
    window: ReportWindow,
    use_filters: bool,
    input: InputFile,
    output: String,
}

impl<C: ApiClient, S: Storage> TrafficJob<C, S> {
    pub fn new(
        client: C,
        storage: S,
        params: QueryParams,
        window: ReportWindow,
        input: impl Into<InputFile>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            client,
            storage,
            params,
            window,
            use_filters: true,
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn with_filters(mut self, use_filters: bool) -> Self {
        self.use_filters = use_filters;
        self
    }

    fn report_params(&self, cpcode: &str, filtered: bool) -> QueryParams {
        let mut params = vec![
            ("start".to_string(), self.window.start_param()),
            ("end".to_string(), self.window.end_param()),
            ("objectIds".to_string(), cpcode.to_string()),
            ("metrics".to_string(), TRAFFIC_METRICS.to_string()),
        ];
        if filtered {
            params.push(("filters".to_string(), DELIVERY_FILTERS.to_string()));
        }
        params.extend(self.params.iter().cloned());
        params
    }

    async fn request_report(&self, cpcode: &str, filtered: bool) -> Result<Value> {
        self.client
            .get_json(HITS_BY_CPCODE_PATH, &self.report_params(cpcode, filtered))
            .await
    }
}

#[async_trait]
impl<C: ApiClient, S: Storage> BatchJob for TrafficJob<C, S> {
    fn name(&self) -> &str {
        "traffic"
    }

    async fn load_input(&self) -> Result<Vec<Row>> {
        self.input.load(&self.storage).await
    }

    fn select(&self, row: &Row) -> Selection {
        match row.get_trimmed("cpcodeId") {
            Some(id) if !id.is_empty() => Selection::Fetch,
            _ => Selection::Skip,
        }
    }

    fn identifier(&self, row: &Row) -> String {
        row.get_trimmed("cpcodeId").unwrap_or_default().to_string()
    }

    /// Tries the filtered report first and falls back to the unfiltered one
    /// when it fails or comes back without data.
    async fn fetch(&self, row: &Row) -> Result<Value> {
        let cpcode = self.identifier(row);
        if self.use_filters {
            match self.request_report(&cpcode, true).await {
                Ok(report) if has_report_data(&report) => return Ok(report),
                Ok(_) => {
                    tracing::info!("🔁 traffic: no filtered data for {}, retrying without filters", cpcode)
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("🔁 traffic: filtered request for {} failed ({}), retrying without filters", cpcode, e)
                }
            }
        }
        self.request_report(&cpcode, false).await
    }

    fn merge(&self, row: &Row, detail: Value) -> Option<Row> {
        let cpcode = self.identifier(row);
        let averages = calculate_averages(&detail);
        if averages.is_none() {
            tracing::warn!("⚠️ traffic: no report data for {}", cpcode);
        }
        Some(summary_row(&cpcode, averages.as_ref()))
    }

    fn on_fetch_error(&self, row: &Row, _error: &EtlError) -> Option<Row> {
        Some(summary_row(&self.identifier(row), None))
    }

    fn output(&self) -> OutputTarget {
        OutputTarget::overwrite(self.output.clone())
    }
}
