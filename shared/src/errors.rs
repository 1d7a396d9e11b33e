//! Upstream failure taxonomy shared by the fetcher and the orchestrator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure reasons for a single upstream API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFailure {
    /// 401
    Unauthorized,
    /// 402, key balance or plan exhausted
    PaymentRequired,
    /// 403
    Forbidden,
    /// 429
    RateLimited,
    /// Any other non-success status, with a truncated body excerpt
    Status { code: u16, body: String },
    /// Request timed out
    Timeout,
    /// Connection or transport failure
    Network(String),
}

impl ApiFailure {
    /// Classify a non-success HTTP status
    pub fn from_status(code: u16, body: &str) -> Self {
        match code {
            401 => ApiFailure::Unauthorized,
            402 => ApiFailure::PaymentRequired,
            403 => ApiFailure::Forbidden,
            429 => ApiFailure::RateLimited,
            _ => ApiFailure::Status {
                code,
                body: excerpt(body),
            },
        }
    }

    /// Authorization or quota problems: calling again will not help
    pub fn is_auth_or_quota(&self) -> bool {
        matches!(
            self,
            ApiFailure::Unauthorized
                | ApiFailure::PaymentRequired
                | ApiFailure::Forbidden
                | ApiFailure::RateLimited
        )
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ApiFailure::Timeout | ApiFailure::Network(_))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiFailure::Unauthorized => Some(401),
            ApiFailure::PaymentRequired => Some(402),
            ApiFailure::Forbidden => Some(403),
            ApiFailure::RateLimited => Some(429),
            ApiFailure::Status { code, .. } => Some(*code),
            ApiFailure::Timeout | ApiFailure::Network(_) => None,
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::Unauthorized => write!(f, "HTTP 401 unauthorized"),
            ApiFailure::PaymentRequired => write!(f, "HTTP 402 payment required"),
            ApiFailure::Forbidden => write!(f, "HTTP 403 forbidden"),
            ApiFailure::RateLimited => write!(f, "HTTP 429 rate limited"),
            ApiFailure::Status { code, body } if body.is_empty() => write!(f, "HTTP {code}"),
            ApiFailure::Status { code, body } => write!(f, "HTTP {code}: {body}"),
            ApiFailure::Timeout => write!(f, "request timed out"),
            ApiFailure::Network(message) => write!(f, "network error: {message}"),
        }
    }
}

/// Error bodies can be whole HTML pages; keep the first 200 characters
fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}
