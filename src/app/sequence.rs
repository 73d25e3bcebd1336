use crate::core::pipeline::{BatchJob, BatchPipeline, RunReport};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::time::Instant;

/// Runs jobs one after another. The first failing job stops the sequence;
/// jobs after it are not started.
pub struct ReportSequence<S: Storage> {
    pipeline: BatchPipeline<S>,
}

impl<S: Storage> ReportSequence<S> {
    pub fn new(storage: S) -> Self {
        Self {
            pipeline: BatchPipeline::new(storage),
        }
    }

    pub async fn run(&mut self, jobs: &[Box<dyn BatchJob>]) -> Result<Vec<RunReport>> {
        let started = Instant::now();
        let mut reports = Vec::with_capacity(jobs.len());

        for (index, job) in jobs.iter().enumerate() {
            tracing::info!("▶️ Job {}/{}: {}", index + 1, jobs.len(), job.name());
            let report = self.pipeline.run(job.as_ref()).await?;
            reports.push(report);
        }

        tracing::info!(
            "🏁 Sequence finished: {} jobs in {:.2?}",
            reports.len(),
            started.elapsed()
        );
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{OutputTarget, Row, Selection, WriteMode, WriteOutcome};
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingStorage {
        writes: Arc<AtomicUsize>,
    }

    impl Storage for CountingStorage {
        async fn read_rows(&self, _path: &str) -> Result<Vec<Row>> {
            Ok(Vec::new())
        }

        async fn write_rows(&self, path: &str, rows: &[Row], _mode: WriteMode) -> Result<WriteOutcome> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(WriteOutcome {
                path: path.into(),
                rows_written: rows.len(),
                header_written: true,
            })
        }

        async fn remove_file(&self, _path: &str) -> Result<bool> {
            Ok(false)
        }
    }

    struct StaticJob {
        name: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl BatchJob for StaticJob {
        fn name(&self) -> &str {
            self.name
        }

        async fn load_input(&self) -> Result<Vec<Row>> {
            if self.fail {
                return Err(EtlError::FileNotFoundError {
                    path: format!("{}.csv", self.name),
                });
            }
            Ok(vec![[("id", "1")].into_iter().collect()])
        }

        fn select(&self, _row: &Row) -> Selection {
            Selection::PassThrough
        }

        fn output(&self) -> OutputTarget {
            OutputTarget::overwrite(format!("{}.csv", self.name))
        }
    }

    fn job(name: &'static str, fail: bool) -> Box<dyn BatchJob> {
        Box::new(StaticJob { name, fail })
    }

    #[tokio::test]
    async fn test_runs_every_job() {
        let storage = CountingStorage::default();
        let mut sequence = ReportSequence::new(storage.clone());

        let reports = sequence
            .run(&[job("first", false), job("second", false)])
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].job, "second");
        assert_eq!(storage.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_jobs() {
        let storage = CountingStorage::default();
        let mut sequence = ReportSequence::new(storage.clone());

        let err = sequence
            .run(&[job("first", false), job("broken", true), job("third", false)])
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::FileNotFoundError { .. }));
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
    }
}
