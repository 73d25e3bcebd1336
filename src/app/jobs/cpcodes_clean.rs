use crate::app::jobs::InputFile;
use crate::core::normalizer::normalize_row;
use crate::core::pipeline::BatchJob;
use crate::domain::model::{OutputTarget, Row, Selection};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Rewrites the nested columns of a CP code listing into flat text.
/// Works on local files only.
pub struct CpCodesCleanJob<S: Storage> {
    storage: S,
    input: InputFile,
    output: String,
}

impl<S: Storage> CpCodesCleanJob<S> {
    pub fn new(storage: S, input: impl Into<InputFile>, output: impl Into<String>) -> Self {
        Self {
            storage,
            input: input.into(),
            output: output.into(),
        }
    }
}

#[async_trait]
impl<S: Storage> BatchJob for CpCodesCleanJob<S> {
    fn name(&self) -> &str {
        "cpcodes-clean"
    }

    async fn load_input(&self) -> Result<Vec<Row>> {
        self.input.load(&self.storage).await
    }

    fn select(&self, _row: &Row) -> Selection {
        Selection::PassThrough
    }

    fn pass_through(&self, row: Row) -> Row {
        normalize_row(&row)
    }

    fn output(&self) -> OutputTarget {
        OutputTarget::overwrite(self.output.clone())
    }
}
