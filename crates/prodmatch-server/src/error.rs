//! Translation of typed failures into HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use prodmatch_core::Error;
use prodmatch_ingest::UploadError;
use prodmatch_resolve::BatchError;

/// An error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "validation_error",
            message: message.into(),
        }
    }

    fn from_core(err: &Error, message: String) -> Self {
        Self {
            status: status_for(err),
            kind: err.kind(),
            message,
        }
    }
}

/// HTTP status for each error kind.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::DegenerateVector(_) | Error::DimensionMismatch { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::Embedding(_) => StatusCode::BAD_GATEWAY,
        Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        Error::Storage(_)
        | Error::Config(_)
        | Error::Io(_)
        | Error::Json(_)
        | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        Self::from_core(&err, message)
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        let message = err.to_string();
        Self::from_core(&err.source, message)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        let message = format!("Catalog upload failed: {}", err);
        Self::from_core(&err.source, message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::validation(format!("Invalid multipart body: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} ({}): {}", self.status, self.kind, self.message);
        } else {
            warn!("{} ({}): {}", self.status, self.kind, self.message);
        }
        (
            self.status,
            Json(serde_json::json!({
                "error": self.message,
                "kind": self.kind,
            })),
        )
            .into_response()
    }
}
