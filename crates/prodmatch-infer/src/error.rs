//! Provider-level failure classification.

use std::time::Duration;

use thiserror::Error;

/// Why a single embedding request failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbedError {
    #[error("rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("provider error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("authentication failed ({status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl EmbedError {
    /// Transient failures are worth retrying; the rest will fail again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout | Self::Connection(_) | Self::Server { .. }
        )
    }

    /// Provider-requested wait before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String, retry_after: Option<Duration>) -> Self {
        match status {
            429 => Self::RateLimited { retry_after },
            401 | 403 => Self::Authentication { status, body },
            408 => Self::Timeout,
            500..=599 => Self::Server { status, body },
            _ => Self::Rejected { status, body },
        }
    }

    /// Classify a transport-level reqwest failure.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || err.is_request() {
            Self::Connection(err.to_string())
        } else if err.is_decode() || err.is_body() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}
