pub mod enricher;
pub mod listing;
pub mod normalizer;
pub mod pacing;
pub mod pipeline;
pub mod repr;
pub mod traffic;

pub use crate::domain::model::{OutputTarget, Row, Selection, WriteMode};
pub use crate::domain::ports::{ApiClient, Clock, Storage};
pub use crate::utils::error::Result;
pub use pipeline::{BatchJob, BatchPipeline, PipelineState, RunReport};
