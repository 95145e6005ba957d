// Error handling module for the MyFlix API
// Provides centralized error types and HTTP response conversion

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::AuthError;
use crate::db::RepositoryError;

/// Main error type for the API
/// All handlers return Result<T, ApiError>
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 422 Unprocessable Entity
    ValidationError(validator::ValidationErrors),

    /// Resource not found
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Duplicate resource conflict
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Bad credentials on /login
    /// Maps to HTTP 400 Bad Request with a generic message
    LoginFailed,

    /// Authenticated caller acting on someone else's account
    /// Maps to HTTP 403 Forbidden
    Forbidden(String),

    /// Repository timeout or outage; safe to retry
    /// Maps to HTTP 503 Service Unavailable
    Unavailable(String),

    /// Body or path that could not be extracted (bad JSON, missing field, bad UUID)
    /// Keeps the extractor's status: 400, 415 or 422
    MalformedRequest { status: StatusCode, message: String },

    /// Authentication core failures render themselves
    Auth(AuthError),
}

/// Consistent error response structure
///
/// Every error body, auth failures included, uses this shape.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Builds a 503 response with a Retry-After hint
pub(crate) fn unavailable_response(body: ErrorResponse) -> Response {
    let mut response = (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
    response
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                let details = serde_json::to_value(&errors).unwrap_or(serde_json::json!({}));
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ErrorResponse::new("VALIDATION_ERROR", "Request validation failed").with_details(details)),
                )
                    .into_response()
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} '{}'", resource, id);
                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new("NOT_FOUND", format!("{} '{}' was not found", resource, id))),
                )
                    .into_response()
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                (StatusCode::CONFLICT, Json(ErrorResponse::new("CONFLICT", message))).into_response()
            }
            ApiError::LoginFailed => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    AuthError::GENERIC_FAILURE_CODE,
                    AuthError::GENERIC_FAILURE_MESSAGE,
                )),
            )
                .into_response(),
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                (StatusCode::FORBIDDEN, Json(ErrorResponse::new("FORBIDDEN", message))).into_response()
            }
            ApiError::Unavailable(detail) => {
                error!("Repository unavailable: {}", detail);
                unavailable_response(ErrorResponse::new(
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable, retry later",
                ))
            }
            ApiError::MalformedRequest { status, message } => {
                debug!("Malformed request: {}", message);
                (status, Json(ErrorResponse::new("MALFORMED_REQUEST", message))).into_response()
            }
            ApiError::Auth(auth_error) => auth_error.into_response(),
        }
    }
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::LoginFailed => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::MalformedRequest { status, .. } => *status,
            ApiError::Auth(auth_error) => auth_error.status_code(),
        }
    }

    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::DuplicateUsername(username) => ApiError::Conflict {
                message: format!("{} already exists", username),
            },
            other => ApiError::Unavailable(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::DuplicateUsername(username) => ApiError::Conflict {
                message: format!("{} already exists", username),
            },
            other => ApiError::Auth(other),
        }
    }
}
