//! HTTP error handling for the web API.
//!
//! Core errors become JSON bodies carrying the error code, with the HTTP
//! status derived from that code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// API error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Error code (e.g., "E002" for code not found)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable error message
    pub message: String,
    /// Additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Create a new API error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with code and message.
    #[must_use]
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.code.as_deref() {
            Some("E001") => StatusCode::BAD_REQUEST,
            Some("E002") => StatusCode::NOT_FOUND,
            Some("E003") => StatusCode::FORBIDDEN,
            Some("E004") => StatusCode::SERVICE_UNAVAILABLE,
            Some("E005") => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message)
    }

    /// Create an internal server error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let status = match self.code.as_deref() {
            None if self.message.contains("not found") => StatusCode::NOT_FOUND,
            None if self.message.contains("invalid") || self.message.contains("must not") => {
                StatusCode::BAD_REQUEST
            }
            _ => status,
        };

        (status, Json(self)).into_response()
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(err: crate::error::Error) -> Self {
        Self {
            code: err.code().map(String::from),
            details: err.suggestion().map(String::from),
            message: err.to_string(),
        }
    }
}

/// Result type for web handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Extension trait for converting Results to ApiResults.
pub trait IntoApiResult<T> {
    /// Convert to an API result.
    #[allow(clippy::missing_errors_doc)]
    fn into_api_result(self) -> ApiResult<T>;
}

impl<T> IntoApiResult<T> for crate::error::Result<T> {
    fn into_api_result(self) -> ApiResult<T> {
        self.map_err(ApiError::from)
    }
}
