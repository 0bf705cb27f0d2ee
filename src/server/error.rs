//! HTTP error mapping.

use crate::Error;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Body returned for every server-side failure.
pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

/// Error returned by HTTP handlers.
///
/// Client errors answer 400 with the error message as `detail`; everything
/// else answers 500 with a generic body and is logged.
#[derive(Debug)]
pub struct ApiError(Error);

impl ApiError {
    /// Returns the status code this error answers with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub(crate) fn join(e: &tokio::task::JoinError) -> Self {
        Self(Error::operation("spawn_blocking", e))
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status == StatusCode::BAD_REQUEST {
            tracing::warn!(error = %self.0, "Request rejected");
            self.0.to_string()
        } else {
            tracing::error!(error = %self.0, "Request failed");
            INTERNAL_ERROR_DETAIL.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
