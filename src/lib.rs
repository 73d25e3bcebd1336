pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{EdgeGridClient, EdgeGridCredentials, LocalStorage};
pub use app::{build_jobs, ReportSequence};
pub use config::{CliConfig, Command, ReportSettings, TomlConfig};
pub use crate::core::pipeline::{BatchJob, BatchPipeline, PipelineState, RunReport};
pub use utils::error::{EtlError, Result};
