//! Unified error handling
//!
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - API response envelope
//!
//! # Error codes
//!
//! | Code | Status | Meaning |
//! |------|--------|---------|
//! | E0000 | 200 | success |
//! | E0002 | 400 | validation failed, invalid ticket input |
//! | E0003 | 404 | resource not found |
//! | E5001 | 409 | printer not connected |
//! | E5002 | 502 | printer unreachable or rejected the job |
//! | E5003 | 504 | printer timed out |
//! | E9001 | 500 | internal error |
//! | E9002 | 500 | storage error |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use ticket_printer::PrintError;
use tracing::error;

use crate::store::StoreError;

/// API response envelope
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 on success)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    /// 404
    NotFound(String),

    #[error("Validation failed: {0}")]
    /// 400
    Validation(String),

    #[error(transparent)]
    /// Status depends on the printer error kind
    Printer(#[from] PrintError),

    #[error("Storage error: {0}")]
    /// 500
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    /// 500
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status, error code and client message
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::Printer(e) => match e {
                PrintError::NotConnected => (StatusCode::CONFLICT, "E5001", e.to_string()),
                PrintError::EncodingInputInvalid(msg) | PrintError::InvalidConfig(msg) => {
                    (StatusCode::BAD_REQUEST, "E0002", msg.clone())
                }
                PrintError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "E5003", e.to_string()),
                PrintError::ConnectionFailed(_)
                | PrintError::DetectionSourceFailed { .. }
                | PrintError::Io(_)
                | PrintError::Usb(_)
                | PrintError::System(_) => (StatusCode::BAD_GATEWAY, "E5002", e.to_string()),
            },
            AppError::Store(e) => {
                error!(target: "store", error = %e, "Storage error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    ok_with_message(data, "Success")
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
    })
}
