//! Error types for the API layer.
//!
//! [`ApiError`] unifies all request failure modes into a single enum that
//! converts into an HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"message": ..., "status": ...}`.
//!
//! Internal faults are logged here and reduced to a generic message so no
//! internal detail reaches the client.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use safespace_db::DbError;
use safespace_safety::SafetyError;

use crate::auth::AuthError;

/// Message returned for every internal error.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The phone number matched but the password did not.
    #[error("Invalid password")]
    InvalidPassword,

    /// Registration with a phone number that is already taken.
    #[error("User already exists with this phone number")]
    DuplicatePhone,

    /// A bearer token was required but missing, or did not verify.
    #[error("{0}")]
    Unauthorized(String),

    /// An unexpected internal fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidPassword | Self::DuplicatePhone => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::DuplicatePhone(_) => Self::DuplicatePhone,
            DbError::UnknownUser(_) => Self::Unauthorized(String::from("User not found")),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken(msg) => Self::Unauthorized(format!("Invalid token: {msg}")),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<SafetyError> for ApiError {
    fn from(e: SafetyError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                INTERNAL_MESSAGE.to_owned()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "message": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidPassword.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::DuplicatePhone.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotFound(String::new()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized(String::new()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_phone_db_error_is_a_client_error() {
        let err = ApiError::from(DbError::DuplicatePhone(String::from("9000000001")));
        assert!(matches!(err, ApiError::DuplicatePhone));
    }

    #[test]
    fn unknown_author_is_unauthorized() {
        let err = ApiError::from(DbError::UnknownUser(safespace_types::UserId::new()));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn other_db_errors_are_internal() {
        let err = ApiError::from(DbError::Corrupt(String::from("bad age")));
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn empty_dataset_is_internal() {
        let err = ApiError::from(SafetyError::EmptyDataset);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
