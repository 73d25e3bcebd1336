pub mod alert_details;
pub mod cpcodes_clean;
pub mod listing;
pub mod traffic;

pub use alert_details::AlertDetailsJob;
pub use cpcodes_clean::CpCodesCleanJob;
pub use listing::ListingJob;
pub use traffic::TrafficJob;

use crate::domain::model::Row;
use crate::domain::ports::{QueryParams, Storage};
use crate::utils::error::{EtlError, Result};
use url::Url;

const PATH_ROOT: &str = "https://localhost";

/// `accountSwitchKey` query parameter, present only when a key is configured.
pub fn account_params(account_switch_key: Option<&str>) -> QueryParams {
    account_switch_key
        .map(|key| vec![("accountSwitchKey".to_string(), key.to_string())])
        .unwrap_or_default()
}

/// CSV file a job reads its rows from. A chained input is written by an
/// earlier job of the same run, and is absent when that job had no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: String,
    pub chained: bool,
}

impl InputFile {
    pub fn required(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            chained: false,
        }
    }

    pub fn chained(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            chained: true,
        }
    }

    /// Rows of the file. A missing chained input is an empty batch; a
    /// missing required input is an error.
    pub async fn load<S: Storage>(&self, storage: &S) -> Result<Vec<Row>> {
        match storage.read_rows(&self.path).await {
            Err(EtlError::FileNotFoundError { path }) if self.chained => {
                tracing::warn!("⚠️ {} not found, the previous job wrote no rows", path);
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

impl From<&str> for InputFile {
    fn from(path: &str) -> Self {
        Self::required(path)
    }
}

impl From<String> for InputFile {
    fn from(path: String) -> Self {
        Self::required(path)
    }
}

/// `base` followed by `segments`, each percent-encoded as a single path
/// segment so ids cannot add path levels or a query string.
pub fn api_path(base: &str, segments: &[&str]) -> Result<String> {
    let invalid = |reason: String| EtlError::ConfigError {
        message: format!("cannot build request path from '{}': {}", base, reason),
    };
    let mut url = Url::parse(PATH_ROOT)
        .and_then(|root| root.join(base))
        .map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("base cannot hold path segments".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_params() {
        assert!(account_params(None).is_empty());
        assert_eq!(
            account_params(Some("F-AC-1")),
            vec![("accountSwitchKey".to_string(), "F-AC-1".to_string())]
        );
    }

    struct EmptyDir;

    impl Storage for EmptyDir {
        async fn read_rows(&self, path: &str) -> Result<Vec<Row>> {
            Err(EtlError::FileNotFoundError {
                path: path.to_string(),
            })
        }

        async fn write_rows(
            &self,
            path: &str,
            _rows: &[Row],
            _mode: crate::domain::model::WriteMode,
        ) -> Result<crate::domain::model::WriteOutcome> {
            Err(EtlError::FileNotFoundError {
                path: path.to_string(),
            })
        }

        async fn remove_file(&self, _path: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_missing_chained_input_is_empty_batch() {
        let rows = InputFile::chained("ops_alerts.csv").load(&EmptyDir).await.unwrap();
        assert!(rows.is_empty());

        let err = InputFile::required("ops_alerts.csv")
            .load(&EmptyDir)
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::FileNotFoundError { .. }));
    }

    #[test]
    fn test_api_path_encodes_segments() {
        assert_eq!(
            api_path("/alerts/v2/alert-summaries", &["456", "details"]).unwrap(),
            "/alerts/v2/alert-summaries/456/details"
        );
        assert_eq!(
            api_path("/alerts/v2/alert-summaries", &["a/b?c=1", "details"]).unwrap(),
            "/alerts/v2/alert-summaries/a%2Fb%3Fc=1/details"
        );
    }
}
