pub mod cli;
pub mod toml_config;

pub use cli::{CliConfig, Command};
pub use toml_config::TomlConfig;

use crate::utils::error::{EtlError, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SECTION: &str = "default";
pub const DEFAULT_PACE_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_START_DAYS_AGO: u32 = 14;
pub const DEFAULT_END_DAYS_AGO: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficSettings {
    pub start_days_ago: u32,
    pub end_days_ago: u32,
    pub use_filters: bool,
}

/// Fully resolved settings handed to every job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub edgerc_path: PathBuf,
    pub section: String,
    pub account_switch_key: Option<String>,
    pub output_dir: PathBuf,
    pub pace_interval: Duration,
    pub request_timeout: Duration,
    pub base_url: Option<String>,
    pub traffic: TrafficSettings,
}

impl ReportSettings {
    /// Command line (and its environment fallbacks) over the file over defaults.
    pub fn resolve(cli: &CliConfig, file: TomlConfig) -> Self {
        let credentials = file.credentials.unwrap_or_default();
        let output = file.output.unwrap_or_default();
        let requests = file.requests.unwrap_or_default();
        let traffic = file.traffic.unwrap_or_default();

        let (cmd_start, cmd_end, no_filters) = match &cli.command {
            Command::Traffic {
                start_days_ago,
                end_days_ago,
                no_filters,
                ..
            } => (*start_days_ago, *end_days_ago, *no_filters),
            _ => (None, None, false),
        };

        Self {
            edgerc_path: cli
                .edgerc
                .clone()
                .or_else(|| credentials.edgerc_path.map(PathBuf::from))
                .unwrap_or_else(default_edgerc_path),
            section: cli
                .section
                .clone()
                .or(credentials.section)
                .unwrap_or_else(|| DEFAULT_SECTION.to_string()),
            account_switch_key: cli
                .account_switch_key
                .clone()
                .or(credentials.account_switch_key)
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            output_dir: cli
                .output_dir
                .clone()
                .or_else(|| output.directory.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(".")),
            pace_interval: Duration::from_millis(
                cli.pace_ms.or(requests.pace_ms).unwrap_or(DEFAULT_PACE_MS),
            ),
            request_timeout: Duration::from_secs(
                cli.timeout_secs
                    .or(requests.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            base_url: cli.base_url.clone().or(requests.base_url),
            traffic: TrafficSettings {
                start_days_ago: cmd_start
                    .or(traffic.start_days_ago)
                    .unwrap_or(DEFAULT_START_DAYS_AGO),
                end_days_ago: cmd_end
                    .or(traffic.end_days_ago)
                    .unwrap_or(DEFAULT_END_DAYS_AGO),
                use_filters: !no_filters && traffic.use_filters.unwrap_or(true),
            },
        }
    }

    /// Label used in output file names: the account switch key, or the
    /// credentials section when acting on the client's own account.
    pub fn account_tag(&self) -> &str {
        self.account_switch_key.as_deref().unwrap_or(&self.section)
    }

    pub fn alerts_file(&self) -> String {
        format!("{}_alerts.csv", self.account_tag())
    }

    pub fn alert_details_file(&self) -> String {
        format!("{}_alerts_details.csv", self.account_tag())
    }

    pub fn raw_cpcodes_file(&self) -> String {
        format!("All_{}_CPcodes.csv", self.account_tag())
    }

    pub fn cleaned_cpcodes_file(&self) -> String {
        format!("Cleaned_All_{}_CPcodes.csv", self.account_tag())
    }

    pub fn traffic_file(&self) -> String {
        "Traffic_by_CPcode.csv".to_string()
    }

    /// Rejects settings no run could succeed with, before any request.
    pub fn validate(&self) -> Result<()> {
        for (field, path) in [("edgerc_path", &self.edgerc_path), ("output_dir", &self.output_dir)] {
            let text = path.to_string_lossy();
            if text.is_empty() || text.contains('\0') {
                return Err(invalid(field, &text, "path must be non-empty and free of NUL bytes"));
            }
        }
        if self.section.trim().is_empty() {
            return Err(invalid("section", &self.section, "section name cannot be blank"));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid("timeout_secs", "0", "timeout must be at least one second"));
        }
        if let Some(base_url) = &self.base_url {
            match Url::parse(base_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => {
                    return Err(invalid(
                        "base_url",
                        base_url,
                        &format!("unsupported scheme '{}'", url.scheme()),
                    ))
                }
                Err(e) => return Err(invalid("base_url", base_url, &e.to_string())),
            }
        }
        if self.traffic.end_days_ago > self.traffic.start_days_ago {
            return Err(invalid(
                "traffic.end_days_ago",
                &self.traffic.end_days_ago.to_string(),
                &format!(
                    "window end must not be before its start ({} days ago)",
                    self.traffic.start_days_ago
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn default_edgerc_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".edgerc"))
        .unwrap_or_else(|| PathBuf::from(".edgerc"))
}
