use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "edge-reports")]
#[command(about = "Pull alerts, CP codes and traffic reports from the EdgeGrid APIs into CSV files")]
pub struct CliConfig {
    /// Optional TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the .edgerc credentials file
    #[arg(long, env = "EDGERC_PATH", global = true)]
    pub edgerc: Option<PathBuf>,

    /// Section of the .edgerc file to use
    #[arg(long, env = "EDGERC_SECTION", global = true)]
    pub section: Option<String>,

    /// Account switch key for acting on another account
    #[arg(long, env = "AKAMAI_ACCOUNT_SWITCH_KEY", global = true)]
    pub account_switch_key: Option<String>,

    /// Directory CSV files are read from and written to
    #[arg(long, env = "EDGE_REPORTS_OUTPUT_DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Minimum delay between API requests, in milliseconds
    #[arg(long, global = true)]
    pub pace_ms: Option<u64>,

    /// Per-request timeout, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Send requests to this base URL instead of the .edgerc host
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List all alert summaries into <key>_alerts.csv
    AlertsList {
        #[arg(long)]
        output: Option<String>,
    },
    /// Fetch definitions for triggered alerts into <key>_alerts_details.csv
    AlertsDetails {
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// List all CP codes into All_<key>_CPcodes.csv
    Cpcodes {
        #[arg(long)]
        output: Option<String>,
    },
    /// Clean the nested columns of a CP code listing
    CpcodesClean {
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Average edge hits and offload per CP code
    Traffic {
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        output: Option<String>,
        #[arg(long)]
        start_days_ago: Option<u32>,
        #[arg(long)]
        end_days_ago: Option<u32>,
        /// Skip the delivery-type / IP-version filtered request
        #[arg(long)]
        no_filters: bool,
    },
    /// Run every job in order
    All,
}

impl Command {
    /// False only for jobs that work purely on local files.
    pub fn requires_api(&self) -> bool {
        !matches!(self, Command::CpcodesClean { .. })
    }
}
