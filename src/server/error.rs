use crate::error::TrackerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// JSON error body `{"error": "<message>"}` with the given status
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl TrackerError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_caller_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        if let Self::StorageUnavailable(source) = &self {
            error!(error = %format!("{:#}", source), "store access failed");
        }
        error_response(self.status_code(), &self.to_string())
    }
}

pub async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}
