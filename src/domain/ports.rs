use crate::domain::model::{Row, WriteMode, WriteOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type QueryParams = Vec<(String, String)>;

/// Authenticated read-only access to the upstream API.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GET `path` with `params`, returning the parsed JSON body of a 2xx response.
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<serde_json::Value>;
}

#[async_trait]
impl<T: ApiClient + ?Sized> ApiClient for Arc<T> {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<serde_json::Value> {
        (**self).get_json(path, params).await
    }
}

pub trait Storage: Send + Sync {
    fn read_rows(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<Row>>> + Send;
    fn write_rows(
        &self,
        path: &str,
        rows: &[Row],
        mode: WriteMode,
    ) -> impl std::future::Future<Output = Result<WriteOutcome>> + Send;
    /// Deletes `path` if it exists; `true` when a file was removed.
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// Time source for pacing; swapped for a manual clock in tests.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}
