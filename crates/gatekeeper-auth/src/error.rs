//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatekeeper_db::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("User {0} already exists")]
    UserExists(String),

    #[error("Invalid reset token")]
    InvalidResetToken,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "Not found"),
            AuthError::UserExists(_) => (StatusCode::BAD_REQUEST, "Email already registered"),
            AuthError::InvalidResetToken => (StatusCode::FORBIDDEN, "Forbidden"),
            AuthError::PasswordHash(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
            AuthError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
