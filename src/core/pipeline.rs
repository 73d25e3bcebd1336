use crate::domain::model::{OutputTarget, Row, Selection, WriteMode};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    LoadingInput,
    Selecting,
    Fetching,
    Merging,
    Writing,
    Done,
    Failed,
}

/// Counters for one run of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub job: String,
    pub loaded: usize,
    pub selected: usize,
    pub passed_through: usize,
    pub skipped: usize,
    pub fetched: usize,
    pub merged: usize,
    pub failed: usize,
    pub written: usize,
    pub output: Option<PathBuf>,
}

/// One batch report: where rows come from, which need a detail request,
/// and how details turn into output rows.
#[async_trait]
pub trait BatchJob: Send + Sync {
    fn name(&self) -> &str;

    async fn load_input(&self) -> Result<Vec<Row>>;

    fn select(&self, row: &Row) -> Selection;

    /// Applied to rows selected as [`Selection::PassThrough`].
    fn pass_through(&self, row: Row) -> Row {
        row
    }

    /// Label used in log lines about this row.
    fn identifier(&self, _row: &Row) -> String {
        String::new()
    }

    async fn fetch(&self, _row: &Row) -> Result<Value> {
        Err(EtlError::ProcessingError {
            message: format!("job '{}' does not fetch details", self.name()),
        })
    }

    /// Output row for a fetched detail; `None` drops the row.
    fn merge(&self, _row: &Row, _detail: Value) -> Option<Row> {
        None
    }

    /// Output row for a failed fetch; `None` drops the row.
    fn on_fetch_error(&self, _row: &Row, _error: &EtlError) -> Option<Row> {
        None
    }

    fn output(&self) -> OutputTarget;
}

enum Planned {
    Ready(Row),
    Fetch(Row),
}

/// Runs a [`BatchJob`] through load, select, fetch, merge and write.
pub struct BatchPipeline<S: Storage> {
    storage: S,
    state: PipelineState,
}

impl<S: Storage> BatchPipeline<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub async fn run<J: BatchJob + ?Sized>(&mut self, job: &J) -> Result<RunReport> {
        let mut report = RunReport {
            job: job.name().to_string(),
            ..RunReport::default()
        };
        tracing::info!("🚀 {}: starting", job.name());

        self.transition(job, PipelineState::LoadingInput);
        let rows = match job.load_input().await {
            Ok(rows) => rows,
            Err(e) => return Err(self.fail(job, e)),
        };
        report.loaded = rows.len();
        tracing::info!("📂 {}: loaded {} rows", job.name(), rows.len());

        self.transition(job, PipelineState::Selecting);
        let mut plan = Vec::with_capacity(rows.len());
        for row in rows {
            match job.select(&row) {
                Selection::Fetch => {
                    report.selected += 1;
                    plan.push(Planned::Fetch(row));
                }
                Selection::PassThrough => {
                    report.passed_through += 1;
                    plan.push(Planned::Ready(job.pass_through(row)));
                }
                Selection::Skip => report.skipped += 1,
            }
        }
        tracing::info!(
            "🔎 {}: {} rows need details, {} pass through, {} skipped",
            job.name(),
            report.selected,
            report.passed_through,
            report.skipped
        );

        let mut output = Vec::with_capacity(plan.len());
        for item in plan {
            let row = match item {
                Planned::Ready(row) => {
                    output.push(row);
                    continue;
                }
                Planned::Fetch(row) => row,
            };

            self.transition(job, PipelineState::Fetching);
            match job.fetch(&row).await {
                Ok(detail) => {
                    report.fetched += 1;
                    self.transition(job, PipelineState::Merging);
                    if let Some(merged) = job.merge(&row, detail) {
                        report.merged += 1;
                        output.push(merged);
                    }
                }
                Err(e) if e.is_fatal() => return Err(self.fail(job, e)),
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        "❌ {}: fetch failed for '{}': {}",
                        job.name(),
                        job.identifier(&row),
                        e
                    );
                    if let Some(fallback) = job.on_fetch_error(&row, &e) {
                        output.push(fallback);
                    }
                }
            }
        }

        self.transition(job, PipelineState::Writing);
        let target = job.output();
        if output.is_empty() {
            tracing::warn!("⚠️ {}: no rows to write", job.name());
            // 舊的輸出檔不能留給下一個 job 當成這次的結果
            if target.mode == WriteMode::Overwrite {
                match self.storage.remove_file(&target.file).await {
                    Ok(true) => tracing::warn!("🗑️ {}: removed stale {}", job.name(), target.file),
                    Ok(false) => {}
                    Err(e) => return Err(self.fail(job, e)),
                }
            }
        } else {
            match self
                .storage
                .write_rows(&target.file, &output, target.mode)
                .await
            {
                Ok(outcome) => {
                    report.written = outcome.rows_written;
                    tracing::info!(
                        "✅ {}: wrote {} rows to {}",
                        job.name(),
                        outcome.rows_written,
                        outcome.path.display()
                    );
                    report.output = Some(outcome.path);
                }
                Err(e) => return Err(self.fail(job, e)),
            }
        }

        self.transition(job, PipelineState::Done);
        Ok(report)
    }

    fn transition<J: BatchJob + ?Sized>(&mut self, job: &J, next: PipelineState) {
        tracing::debug!("🔄 {}: {:?} -> {:?}", job.name(), self.state, next);
        self.state = next;
    }

    fn fail<J: BatchJob + ?Sized>(&mut self, job: &J, error: EtlError) -> EtlError {
        tracing::error!("❌ {}: failed in {:?}: {}", job.name(), self.state, error);
        self.state = PipelineState::Failed;
        error
    }
}
