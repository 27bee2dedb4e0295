//! Error types for VerAPI
//!
//! [`ApiError`] is returned while serving a request and renders as a JSON
//! body. [`BuildError`] is raised while the application is assembled and
//! aborts startup.

use crate::router::RouteConflictError;
use http::StatusCode;
use serde::Serialize;
use std::fmt;

/// Result type alias for VerAPI operations
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Standard API error type
///
/// Provides structured error responses following a consistent JSON format.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error type identifier
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Internal details, logged but never sent to the client
    pub(crate) internal: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(
        status: StatusCode,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
            internal: None,
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed", message)
    }

    /// Create a 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// Add internal details (for logging, hidden from the response)
    pub fn with_internal(mut self, details: impl Into<String>) -> Self {
        self.internal = Some(details.into());
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON representation of API error response
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        if let Some(details) = &err.internal {
            tracing::error!(error_type = %err.error_type, details = %details, "{}", err.message);
        }
        Self {
            error: ErrorBody {
                error_type: err.error_type,
                message: err.message,
            },
        }
    }
}

// Conversion from common error types
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal("I/O error").with_internal(err.to_string())
    }
}

impl From<hyper::Error> for ApiError {
    fn from(err: hyper::Error) -> Self {
        ApiError::internal("HTTP error").with_internal(err.to_string())
    }
}

/// Error raised while assembling an application
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The versioning pass already ran on this application
    #[error("application routes are already versioned")]
    AlreadyVersioned,

    /// The prefix format lacks an unescaped `{version}` placeholder or does
    /// not render an absolute path without a trailing `/`
    #[error("prefix format `{format}` must render `/...{{version}}...` without a trailing `/`")]
    InvalidPrefixFormat { format: String },

    #[error(transparent)]
    RouteConflict(#[from] Box<RouteConflictError>),

    #[error("failed to serialize OpenAPI document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid versioning configuration: {0}")]
    Config(#[from] envy::Error),
}

impl From<RouteConflictError> for BuildError {
    fn from(err: RouteConflictError) -> Self {
        BuildError::RouteConflict(Box::new(err))
    }
}
