//! API error responses
//!
//! Every failure is rendered as `{success: false, error, message}` with a
//! status code derived from the core error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use wayfarer_core::{Error, UserFriendlyError};

/// Body of a failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Handler error
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// 400 with a validation message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                success: false,
                error: "invalid_request".to_string(),
                message: message.into(),
                suggestion: None,
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Error::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Error::LlmTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::Llm(_) | Error::Tool(_) => StatusCode::BAD_GATEWAY,
            Error::Synthesis(_) | Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(code = e.code(), error = %e, "Request failed");
        } else {
            tracing::debug!(code = e.code(), error = %e, "Request rejected");
        }

        Self {
            status,
            body: ErrorBody {
                success: false,
                error: e.code().to_string(),
                message: e.user_message(),
                suggestion: e.suggestion(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
