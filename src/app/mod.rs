pub mod jobs;
pub mod sequence;

pub use sequence::ReportSequence;

use crate::config::{Command, ReportSettings};
use crate::core::pipeline::BatchJob;
use crate::core::traffic::ReportWindow;
use crate::domain::ports::{ApiClient, QueryParams, Storage};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use jobs::{account_params, AlertDetailsJob, CpCodesCleanJob, InputFile, ListingJob, TrafficJob};

/// Builds the jobs behind one sub-command, in the order they must run.
/// `client` may be `None` only for commands that never call the API.
pub fn build_jobs<C, S>(
    command: &Command,
    settings: &ReportSettings,
    client: Option<C>,
    storage: S,
    now: DateTime<Utc>,
) -> Result<Vec<Box<dyn BatchJob>>>
where
    C: ApiClient + Clone + 'static,
    S: Storage + Clone + 'static,
{
    let factory = JobFactory {
        settings,
        client,
        storage,
        params: account_params(settings.account_switch_key.as_deref()),
        now,
        chained: matches!(command, Command::All),
    };

    let jobs = match command {
        Command::AlertsList { output } => vec![factory.alerts_list(output.clone())?],
        Command::AlertsDetails { input, output } => {
            vec![factory.alert_details(input.clone(), output.clone())?]
        }
        Command::Cpcodes { output } => vec![factory.cpcodes(output.clone())?],
        Command::CpcodesClean { input, output } => {
            vec![factory.cpcodes_clean(input.clone(), output.clone())]
        }
        Command::Traffic { input, output, .. } => {
            vec![factory.traffic(input.clone(), output.clone())?]
        }
        Command::All => vec![
            factory.alerts_list(None)?,
            factory.alert_details(None, None)?,
            factory.cpcodes(None)?,
            factory.cpcodes_clean(None, None),
            factory.traffic(None, None)?,
        ],
    };
    Ok(jobs)
}

struct JobFactory<'a, C, S> {
    settings: &'a ReportSettings,
    client: Option<C>,
    storage: S,
    params: QueryParams,
    now: DateTime<Utc>,
    /// Default inputs are outputs of earlier jobs in the same run.
    chained: bool,
}

impl<C, S> JobFactory<'_, C, S>
where
    C: ApiClient + Clone + 'static,
    S: Storage + Clone + 'static,
{
    fn client(&self) -> Result<C> {
        self.client.clone().ok_or_else(|| EtlError::MissingConfigError {
            field: "API client (.edgerc credentials)".to_string(),
        })
    }

    fn input(&self, given: Option<String>, default: String) -> InputFile {
        match given {
            Some(path) => InputFile::required(path),
            None if self.chained => InputFile::chained(default),
            None => InputFile::required(default),
        }
    }

    fn alerts_list(&self, output: Option<String>) -> Result<Box<dyn BatchJob>> {
        Ok(Box::new(ListingJob::alerts(
            self.client()?,
            self.params.clone(),
            output.unwrap_or_else(|| self.settings.alerts_file()),
        )))
    }

    fn alert_details(&self, input: Option<String>, output: Option<String>) -> Result<Box<dyn BatchJob>> {
        Ok(Box::new(AlertDetailsJob::new(
            self.client()?,
            self.storage.clone(),
            self.params.clone(),
            self.input(input, self.settings.alerts_file()),
            output.unwrap_or_else(|| self.settings.alert_details_file()),
        )))
    }

    fn cpcodes(&self, output: Option<String>) -> Result<Box<dyn BatchJob>> {
        Ok(Box::new(ListingJob::cpcodes(
            self.client()?,
            self.params.clone(),
            output.unwrap_or_else(|| self.settings.raw_cpcodes_file()),
        )))
    }

    fn cpcodes_clean(&self, input: Option<String>, output: Option<String>) -> Box<dyn BatchJob> {
        Box::new(CpCodesCleanJob::new(
            self.storage.clone(),
            self.input(input, self.settings.raw_cpcodes_file()),
            output.unwrap_or_else(|| self.settings.cleaned_cpcodes_file()),
        ))
    }

    fn traffic(&self, input: Option<String>, output: Option<String>) -> Result<Box<dyn BatchJob>> {
        let traffic = &self.settings.traffic;
        let window = ReportWindow::days_ago(self.now, traffic.start_days_ago, traffic.end_days_ago);
        tracing::info!(
            "📅 Traffic window: {} .. {}",
            window.start_param(),
            window.end_param()
        );
        Ok(Box::new(
            TrafficJob::new(
                self.client()?,
                self.storage.clone(),
                self.params.clone(),
                window,
                self.input(input, self.settings.cleaned_cpcodes_file()),
                output.unwrap_or_else(|| self.settings.traffic_file()),
            )
            .with_filters(traffic.use_filters),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::csv_storage::LocalStorage;
    use crate::config::{CliConfig, TomlConfig};
    use async_trait::async_trait;
    use clap::Parser;
    use serde_json::Value;
    use std::sync::Arc;

    struct NullClient;

    #[async_trait]
    impl ApiClient for NullClient {
        async fn get_json(&self, _path: &str, _params: &[(String, String)]) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn settings(args: &[&str]) -> (CliConfig, ReportSettings) {
        let cli = CliConfig::try_parse_from(args).unwrap();
        let settings = ReportSettings::resolve(&cli, TomlConfig::default());
        (cli, settings)
    }

    #[test]
    fn test_all_builds_jobs_in_order() {
        let (cli, settings) = settings(&["edge-reports", "--edgerc", "/tmp/x", "all"]);
        let jobs = build_jobs(
            &cli.command,
            &settings,
            Some(Arc::new(NullClient)),
            LocalStorage::new("/tmp"),
            Utc::now(),
        )
        .unwrap();

        let names: Vec<&str> = jobs.iter().map(|job| job.name()).collect();
        assert_eq!(
            names,
            vec!["alerts-list", "alerts-details", "cpcodes", "cpcodes-clean", "traffic"]
        );
    }

    #[test]
    fn test_default_files_chain_between_jobs() {
        let (cli, settings) = settings(&[
            "edge-reports",
            "--edgerc",
            "/tmp/x",
            "--account-switch-key",
            "K",
            "all",
        ]);
        let jobs = build_jobs(
            &cli.command,
            &settings,
            Some(Arc::new(NullClient)),
            LocalStorage::new("/tmp"),
            Utc::now(),
        )
        .unwrap();

        let outputs: Vec<String> = jobs.iter().map(|job| job.output().file).collect();
        assert_eq!(
            outputs,
            vec![
                "K_alerts.csv",
                "K_alerts_details.csv",
                "All_K_CPcodes.csv",
                "Cleaned_All_K_CPcodes.csv",
                "Traffic_by_CPcode.csv"
            ]
        );
    }

    #[test]
    fn test_clean_runs_without_client() {
        let (cli, settings) = settings(&["edge-reports", "cpcodes-clean", "--input", "raw.csv"]);
        let jobs =
            build_jobs::<Arc<NullClient>, _>(&cli.command, &settings, None, LocalStorage::new("/tmp"), Utc::now())
                .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output().file, settings.cleaned_cpcodes_file());
    }

    #[test]
    fn test_api_job_without_client_is_config_error() {
        let (cli, settings) = settings(&["edge-reports", "cpcodes"]);
        let err =
            build_jobs::<Arc<NullClient>, _>(&cli.command, &settings, None, LocalStorage::new("/tmp"), Utc::now())
                .err()
                .unwrap();
        assert!(matches!(err, EtlError::MissingConfigError { .. }));
    }
}
