use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Interrupted after {completed} of {total} dates")]
    Interrupted { completed: usize, total: usize },
}

impl BackfillError {
    /// 給操作者看的修正建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BackfillError::HttpClientError(_) => {
                "Check the TLS setup and the timeout values passed to the HTTP client"
            }
            BackfillError::IoError(_) => {
                "Check that the temp directory is writable and the dates file is readable"
            }
            BackfillError::SerializationError(_) => "Retry with --output-format text",
            BackfillError::ConfigValidationError { .. } => {
                "Fix the configuration file or flags and run again"
            }
            BackfillError::InvalidConfigValueError { .. } => {
                "Dates must be YYYY-MM-DD and the base URL must be http(s)"
            }
            BackfillError::Interrupted { .. } => {
                "Re-run with the remaining dates; completed dates do not need to be repeated"
            }
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            BackfillError::Interrupted { .. } => 130,
            _ => 1,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, BackfillError::Interrupted { .. })
    }
}

pub type Result<T> = std::result::Result<T, BackfillError>;
