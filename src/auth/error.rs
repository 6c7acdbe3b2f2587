use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::repo::StoreError;

/// Failures of the signup and login handlers.
///
/// Every variant but `Internal` is caused by the client and maps to a
/// fixed plain-text message. `Internal` is logged in full and answered
/// with a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email and password are required")]
    Validation,
    #[error("user already exists")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("password is incorrect")]
    Authentication,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::Conflict,
            StoreError::Other(e) => AuthError::Internal(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Validation => {
                (StatusCode::BAD_REQUEST, "Email and Password are required.").into_response()
            }
            AuthError::Conflict => (StatusCode::BAD_REQUEST, "User already exists.").into_response(),
            AuthError::NotFound => {
                (StatusCode::NOT_FOUND, "User with the given email not found.").into_response()
            }
            AuthError::Authentication => {
                (StatusCode::UNAUTHORIZED, "Password is incorrect.").into_response()
            }
            AuthError::Internal(e) => {
                error!(error = ?e, "auth request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
