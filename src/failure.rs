//! Classification of failed caption calls into HTTP-facing errors.
//!
//! Only failures of the external call itself land here; refusals and empty
//! responses are handled by [`crate::normalize`]. Classification is by
//! substring of the failure message, first matching rule wins.

use crate::Error;
use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidCredentials,
    UpstreamTimeout,
    ModelUnavailable,
    QuotaExceeded,
    Internal,
}

impl FailureKind {
    pub fn status(&self) -> StatusCode {
        match self {
            FailureKind::InvalidCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            FailureKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            FailureKind::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            FailureKind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self, detail: &str) -> String {
        match self {
            FailureKind::InvalidCredentials => {
                "Invalid or missing API key. Check your credentials and the server configuration."
                    .to_string()
            }
            FailureKind::UpstreamTimeout => {
                "The request to the AI service took too long to respond (timeout).".to_string()
            }
            FailureKind::ModelUnavailable => format!(
                "The configured AI model was not found or has been deprecated. Check the server configuration. Detail: {}",
                detail
            ),
            FailureKind::QuotaExceeded => {
                "API quota exceeded. Check your usage limits on the Google AI platform.".to_string()
            }
            FailureKind::Internal => {
                "An internal error occurred while generating the caption. Please try again later."
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFailure {
    pub kind: FailureKind,
    pub status: StatusCode,
    pub message: String,
}

fn kind_of(message: &str) -> FailureKind {
    let lower = message.to_lowercase();

    if message.contains("API key not valid") || message.contains("API_KEY_INVALID") {
        FailureKind::InvalidCredentials
    } else if message.contains("DeadlineExceeded") {
        FailureKind::UpstreamTimeout
    } else if message.contains("404") && (lower.contains("model") || lower.contains("deprecated"))
    {
        FailureKind::ModelUnavailable
    } else if lower.contains("quota") || message.contains("ResourceExhausted") {
        FailureKind::QuotaExceeded
    } else {
        FailureKind::Internal
    }
}

pub fn classify_message(message: &str) -> ClassifiedFailure {
    let kind = kind_of(message);
    ClassifiedFailure {
        kind,
        status: kind.status(),
        message: kind.user_message(message),
    }
}

/// Classify a failed caption call by its error text.
pub fn classify(failure: &Error) -> ClassifiedFailure {
    let classified = classify_message(&failure.to_string());
    tracing::error!(
        kind = ?classified.kind,
        status = classified.status.as_u16(),
        "Caption call failed: {}",
        failure
    );
    classified
}
