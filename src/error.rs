//! Error types for Thinkrelay
//!
//! Every failure in the request pipeline is an [`AppError`]. The
//! `IntoResponse` implementation is the single place where errors become
//! HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Missing bearer token in Authorization header")]
    MissingCredential,

    #[error("Local model error: {message}")]
    LocalModel {
        status: Option<u16>,
        message: String,
    },

    #[error("Upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Stream relay error: {0}")]
    StreamRelay(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Local endpoint failure, carrying its status when one was received
    pub fn local_model(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::LocalModel {
            status,
            message: message.into(),
        }
    }

    /// Upstream endpoint failure, carrying its status when one was received
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// HTTP status this error maps to
    ///
    /// Errors carrying an explicit status use it; everything else is a 500.
    pub fn status_code(&self) -> StatusCode {
        let explicit = match self {
            AppError::Validation(_) => Some(StatusCode::BAD_REQUEST.as_u16()),
            AppError::MissingCredential => Some(StatusCode::UNAUTHORIZED.as_u16()),
            AppError::LocalModel { status, .. } | AppError::Upstream { status, .. } => *status,
            AppError::StreamRelay(_) | AppError::Internal(_) => None,
        };

        explicit
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        } else {
            warn!(status = %status, error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
