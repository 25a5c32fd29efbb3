//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Message returned for both unknown users and wrong passwords
pub const INVALID_CREDENTIALS: &str = "Incorrect username or password";

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed or incomplete request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown username or wrong password; the two are indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.to_string())
            }
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
