//! Orchestrator-specific error types

use fetcher::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error(transparent)]
    FetchError(#[from] FetchError),

    #[error("Checkpoint write failed: {path}: {source}")]
    CheckpointError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt checkpoint: {message}")]
    CorruptCheckpoint { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    CsvError(#[from] csv::Error),
}

impl OrchestratorError {
    pub fn config(message: impl Into<String>) -> Self {
        OrchestratorError::ConfigurationError {
            message: message.into(),
        }
    }

    /// True when the run stopped because upstream refused access
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, OrchestratorError::FetchError(FetchError::QuotaExhausted { .. }))
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
