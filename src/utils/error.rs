use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatusError {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Authentication error: {message}")]
    AuthError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input file not found: {path}")]
    FileNotFoundError { path: String },

    #[error("Column mismatch in {path}: file has [{existing}], batch has [{incoming}]")]
    ColumnMismatchError {
        path: String,
        existing: String,
        incoming: String,
    },

    #[error("Unexpected response shape: {message}")]
    ParseError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// Coarse grouping used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Request,
    Parse,
    File,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Exit status of a run that stopped on an error of this severity.
    /// Never 0: a run that returned an error did not finish.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::AuthError { .. } => ErrorCategory::Auth,
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Request,
            EtlError::SerializationError(_)
            | EtlError::ParseError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Parse,
            EtlError::CsvError(_)
            | EtlError::IoError(_)
            | EtlError::FileNotFoundError { .. }
            | EtlError::ColumnMismatchError { .. } => ErrorCategory::File,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Parse => ErrorSeverity::Low,
            ErrorCategory::Request => ErrorSeverity::Medium,
            ErrorCategory::File => ErrorSeverity::High,
            ErrorCategory::Auth | ErrorCategory::Config => ErrorSeverity::Critical,
        }
    }

    /// Fatal errors abort the whole run; everything else is isolated to one row.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Auth | ErrorCategory::File | ErrorCategory::Config
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::AuthError { .. } => {
                "Check the .edgerc path, section name and that the API client has access to the account"
            }
            EtlError::ApiError(_) => "Check network connectivity and re-run the job",
            EtlError::HttpStatusError { .. } => {
                "Inspect the logged response body; re-run only the failed identifiers"
            }
            EtlError::FileNotFoundError { .. } => {
                "Run the step that produces this file first, or pass --input explicitly"
            }
            EtlError::ColumnMismatchError { .. } => {
                "Move the existing output file aside or write to a different --output"
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
            EtlError::SerializationError(_)
            | EtlError::ParseError { .. }
            | EtlError::ProcessingError { .. } => {
                "The upstream response had an unexpected shape; see the debug log for the raw body"
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Fix the configuration file or command line flags and try again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Auth => format!("Could not authenticate: {}", self),
            ErrorCategory::Request => format!("Request to the API failed: {}", self),
            ErrorCategory::Parse => format!("Could not interpret API data: {}", self),
            ErrorCategory::File => format!("File problem: {}", self),
            ErrorCategory::Config => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let auth = EtlError::AuthError {
            message: "missing client_secret".to_string(),
        };
        assert!(auth.is_fatal());
        assert_eq!(auth.severity(), ErrorSeverity::Critical);

        let missing = EtlError::FileNotFoundError {
            path: "alerts.csv".to_string(),
        };
        assert!(missing.is_fatal());
        assert_eq!(missing.category(), ErrorCategory::File);

        let http = EtlError::HttpStatusError {
            status: 404,
            url: "https://host/x".to_string(),
            body: String::new(),
        };
        assert!(!http.is_fatal());
        assert_eq!(http.category(), ErrorCategory::Request);

        let parse = EtlError::ParseError {
            message: "no data array".to_string(),
        };
        assert!(!parse.is_fatal());
        assert_eq!(parse.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_aborted_run_never_exits_zero() {
        let body_not_json = serde_json::from_str::<serde_json::Value>("<html>maintenance</html>")
            .map_err(EtlError::from)
            .unwrap_err();
        assert_eq!(body_not_json.severity(), ErrorSeverity::Low);
        assert_eq!(body_not_json.severity().exit_code(), 1);

        assert_eq!(ErrorSeverity::Medium.exit_code(), 2);
        assert_eq!(ErrorSeverity::High.exit_code(), 1);
        assert_eq!(ErrorSeverity::Critical.exit_code(), 3);
    }
}
