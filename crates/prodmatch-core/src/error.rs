//! Error types for ProdMatch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed caller input: missing fields, non-JSON upload, empty payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The embedding provider failed (network, auth, quota, bad response).
    #[error("Embedding service error: {0}")]
    Embedding(String),

    /// The catalog store failed to query or insert.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    /// A vector with zero norm was submitted for comparison.
    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable snake_case name of the error kind, used in API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Embedding(_) => "embedding_service_error",
            Self::Storage(_) => "storage_error",
            Self::Timeout { .. } => "timeout_error",
            Self::DegenerateVector(_) => "degenerate_vector_error",
            Self::DimensionMismatch { .. } => "dimension_mismatch_error",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
