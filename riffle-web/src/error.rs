//! Centralized error-to-response mapping.
//!
//! Every failure leaving this server, whether raised by a collaborator
//! check (missing `Range`, bad filename) or by the streaming core, becomes
//! the same JSON shape: `{"status": "fail" | "error", "message": ...}`,
//! `fail` for client errors and `error` for server errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use riffle_core::{RuntimeMode, StreamError};
use serde_json::json;
use tracing::{error, warn};

/// A terminal request failure carrying its HTTP status and client message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The request arrived without a `Range` header.
    pub fn missing_range() -> Self {
        Self::new(
            StatusCode::RANGE_NOT_SATISFIABLE,
            "Requires Range header for streaming",
        )
    }

    /// The resource identifier failed the allow-list pattern.
    pub fn invalid_resource_name(name: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid resource name format: '{name}'"),
        )
    }

    /// Maps a core streaming failure to its HTTP equivalent.
    ///
    /// In production mode, 500-class messages are replaced with a generic
    /// string so internal detail never reaches clients; the full error is
    /// still logged here, where the detail is last available.
    pub fn from_stream_error(err: StreamError, mode: RuntimeMode) -> Self {
        let status = match &err {
            StreamError::PathTraversal { .. } => StatusCode::FORBIDDEN,
            StreamError::NotFound => StatusCode::NOT_FOUND,
            StreamError::MalformedRange { .. } | StreamError::UnsatisfiableRange { .. } => {
                StatusCode::RANGE_NOT_SATISFIABLE
            }
            StreamError::Upstream { .. } | StreamError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status.is_server_error() {
            error!(error = %err, "unexpected streaming failure");
            if mode.is_production() {
                "An internal server error occurred.".to_string()
            } else {
                err.to_string()
            }
        } else {
            err.to_string()
        };

        Self { status, message }
    }

    /// The HTTP status this error responds with.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The message sent to the client.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_label = if self.status.is_server_error() {
            "error"
        } else {
            // Server errors were already logged with full detail at mapping time.
            warn!(status = %self.status, message = %self.message, "request rejected");
            "fail"
        };

        (
            self.status,
            Json(json!({
                "status": status_label,
                "message": self.message,
            })),
        )
            .into_response()
    }
}
