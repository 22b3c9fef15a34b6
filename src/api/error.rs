//! HTTP error responses.

use std::any::Any;

use axum::{
    body::Body,
    http::{header, Response as HttpResponse, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::{StoreError, ValidationError};

/// Message for any failure the caller cannot fix.
pub const INTERNAL_ERROR: &str = "Internal server error";
/// Message for a failed list request.
pub const LIST_ERROR: &str = "Could not read student list";

/// Error body: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Request body failed a validation rule.
    Validation(ValidationError),
    /// Request body was not parseable JSON. Reported as a generic failure.
    MalformedBody(serde_json::Error),
    /// Store failure while creating a student.
    CreateFailed(StoreError),
    /// Store failure while listing students.
    ListFailed(StoreError),
    /// No route matched.
    NotFound,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MalformedBody(_) | ApiError::CreateFailed(_) | ApiError::ListFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Caller-facing message. Server-side details are never included.
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(err) => err.to_string(),
            ApiError::MalformedBody(_) | ApiError::CreateFailed(_) => INTERNAL_ERROR.to_string(),
            ApiError::ListFailed(_) => LIST_ERROR.to_string(),
            ApiError::NotFound => "Not found".to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::MalformedBody(err) => {
                error!(error = %err, "Unhandled error parsing request body")
            }
            ApiError::CreateFailed(err) => error!(error = %err, "POST /api/students failed"),
            ApiError::ListFailed(err) => error!(error = %err, "GET /api/students failed"),
            _ => {}
        }

        let body = ErrorBody {
            error: self.message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Convert a handler panic into a generic 500. Used by `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> HttpResponse<Body> {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Unhandled error");

    let body = serde_json::json!({ "error": INTERNAL_ERROR }).to_string();
    HttpResponse::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
