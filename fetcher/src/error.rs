//! Fetcher error types

use shared::{ApiFailure, Stage};
use thiserror::Error;

/// Result type for fetcher operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Conditions that end a run. Everything softer is absorbed by the
/// component that owns the call.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{stage}: upstream refused access ({failure}); aborting run")]
    QuotaExhausted { stage: Stage, failure: ApiFailure },

    #[error("{stage}: page {page} failed: {failure}")]
    PageFailed {
        stage: Stage,
        page: u32,
        failure: ApiFailure,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("HTTP client error: {0}")]
    ClientError(#[from] reqwest::Error),
}

impl FetchError {
    pub fn config(message: impl Into<String>) -> Self {
        FetchError::ConfigError {
            message: message.into(),
        }
    }

    /// The upstream failure behind this error, if any
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            FetchError::QuotaExhausted { failure, .. } | FetchError::PageFailed { failure, .. } => Some(failure),
            FetchError::ConfigError { .. } | FetchError::ClientError(_) => None,
        }
    }
}
