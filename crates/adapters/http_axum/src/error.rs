//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use scenehub_domain::error::SceneHubError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`SceneHubError`] to an HTTP response with an appropriate status code.
#[derive(Debug)]
pub struct ApiError(SceneHubError);

impl From<SceneHubError> for ApiError {
    fn from(err: SceneHubError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            SceneHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            SceneHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            SceneHubError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
            SceneHubError::Device(err) => {
                tracing::error!(error = %err, "device error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            SceneHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
