//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repositories::StoreError;

/// Diagnostic attached to 500 responses, surfaced to clients in dev mode only
#[derive(Debug, Clone)]
pub struct ErrorDetails(pub String);

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body failed validation; every violation is listed
    #[error("Invalid data: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Missing, malformed or expired bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upload exceeded the configured size
    #[error("File too large")]
    PayloadTooLarge,

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn car_not_found() -> Self {
        ApiError::NotFound("Car not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Invalid data", "errors": errors })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Authentication required" })),
            )
                .into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "message": "File too large" })),
            )
                .into_response(),
            ApiError::Store(err @ StoreError::Conflict { .. }) => {
                let message = match err.conflicting_field() {
                    Some(field) => format!("A car with this {} already exists", field),
                    None => "A car with these values already exists".to_string(),
                };
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "message": message, "code": err.code() })),
                )
                    .into_response()
            }
            ApiError::Store(err) => {
                error!("Store failure: {}", err);
                internal_error(err.code(), err.to_string())
            }
            ApiError::Internal(details) => {
                error!("Internal error: {}", details);
                internal_error("INTERNAL_ERROR", details)
            }
        }
    }
}

fn internal_error(code: &str, details: String) -> Response {
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Internal server error", "code": code })),
    )
        .into_response();
    response.extensions_mut().insert(ErrorDetails(details));
    response
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_lists_errors() {
        let response = ApiError::Validation(vec!["Make is required".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid data");
        assert_eq!(body["errors"], json!(["Make is required"]));
    }

    #[tokio::test]
    async fn test_conflict_names_field() {
        let response = ApiError::from(StoreError::Conflict {
            constraint: "cars_stock_number_key".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["message"], "A car with this stock_number already exists");
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_storage_error_hides_details() {
        let response = ApiError::from(StoreError::from(sqlx::Error::PoolTimedOut)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ErrorDetails>().is_some());

        let body = body_json(response).await;
        assert_eq!(body["code"], "STORAGE_ERROR");
        assert!(body.get("details").is_none());
    }
}
