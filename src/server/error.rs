use crate::failure;
use crate::models::ErrorResponse;
use crate::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub const MODEL_NOT_INITIALIZED: &str =
    "The AI model was not initialized correctly. Check the API configuration and the server logs.";

/// HTTP-level error. Renders as `{"error": "..."}` so handlers can return
/// `Result<T, ApiError>`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    ModelNotInitialized,
    Upstream(failure::ClassifiedFailure),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::ModelNotInitialized => ApiError::ModelNotInitialized,
            other => ApiError::Upstream(failure::classify(&other)),
        }
    }
}

impl ApiError {
    /// Status code and user-facing message, shared by the HTTP and CLI paths.
    pub fn into_parts(self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::ModelNotInitialized => (
                StatusCode::INTERNAL_SERVER_ERROR,
                MODEL_NOT_INITIALIZED.to_string(),
            ),
            ApiError::Upstream(classified) => (classified.status, classified.message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.into_parts();
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
