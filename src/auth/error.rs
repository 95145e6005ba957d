// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::db::RepositoryError;
use crate::error::{unavailable_response, ErrorResponse};

/// Failure kinds of the authentication core
///
/// The five credential/token kinds stay distinct internally so they can be
/// logged, but all of them render the same outward response.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no identity matches the presented username")]
    UnknownUser,

    #[error("password does not match the stored hash")]
    BadPassword,

    #[error("token signature is invalid or the token is malformed")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token subject no longer resolves to an identity")]
    UnknownSubject,

    #[error("no bearer token presented")]
    MissingCredential,

    #[error("identity repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("token generation error: {0}")]
    TokenGeneration(String),
}

impl AuthError {
    pub const GENERIC_FAILURE_CODE: &'static str = "AUTHENTICATION_FAILED";
    pub const GENERIC_FAILURE_MESSAGE: &'static str = "Authentication failed";

    /// True for the kinds that collapse into the generic "authentication failed"
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            AuthError::UnknownUser
                | AuthError::BadPassword
                | AuthError::InvalidSignature
                | AuthError::Expired
                | AuthError::UnknownSubject
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UnknownUser
            | AuthError::BadPassword
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::UnknownSubject
            | AuthError::MissingCredential => StatusCode::UNAUTHORIZED,
            AuthError::RepositoryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::DuplicateUsername(_) => StatusCode::CONFLICT,
            AuthError::PasswordHash(_) | AuthError::TokenGeneration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-safe body; never names the credential kind that failed
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            _ if self.is_credential_failure() => {
                ErrorResponse::new(Self::GENERIC_FAILURE_CODE, Self::GENERIC_FAILURE_MESSAGE)
            }
            AuthError::MissingCredential => {
                ErrorResponse::new("MISSING_CREDENTIAL", "Missing authentication token")
            }
            AuthError::RepositoryUnavailable(_) => ErrorResponse::new(
                "SERVICE_UNAVAILABLE",
                "Service temporarily unavailable, retry later",
            ),
            AuthError::DuplicateUsername(username) => {
                ErrorResponse::new("CONFLICT", format!("{} already exists", username))
            }
            _ => ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred"),
        }
    }
}

impl From<RepositoryError> for AuthError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::DuplicateUsername(username) => AuthError::DuplicateUsername(username),
            other => AuthError::RepositoryUnavailable(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            e if e.is_credential_failure() => warn!(reason = %e, "Authentication rejected"),
            AuthError::MissingCredential => warn!("Missing token in request"),
            AuthError::DuplicateUsername(username) => warn!("Duplicate username: {}", username),
            e => error!("Auth infrastructure error: {}", e),
        }

        let body = self.to_error_response();
        match self.status_code() {
            StatusCode::SERVICE_UNAVAILABLE => unavailable_response(body),
            status => (status, Json(body)).into_response(),
        }
    }
}
