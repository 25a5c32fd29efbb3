//! Authentication service routes

use std::sync::OnceLock;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    AppState,
    error::{AuthError, AuthResult},
    models::{LoginCredentials, User},
    repositories::user::{hash_password, verify_password},
};

const CREDENTIALS_REQUIRED: &str = "Username and password are required";

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "auth-service"
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(credentials) =
        payload.map_err(|_| AuthError::BadRequest(CREDENTIALS_REQUIRED.to_string()))?;
    let (username, password) = credentials
        .complete()
        .ok_or_else(|| AuthError::BadRequest(CREDENTIALS_REQUIRED.to_string()))?;

    info!("Login attempt for user: {}", username);

    let user = state
        .user_repository
        .find_by_username(username)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?;

    let user = authenticate(user, password.to_string())
        .await
        .inspect_err(|_| {
            info!("Rejected login for user: {}", username);
        })?;

    let token = state
        .jwt_service
        .issue_token(user.id, &user.username)
        .map_err(|e| {
            error!("Failed to issue token: {}", e);
            AuthError::InternalServerError
        })?;

    Ok(Json(TokenResponse { token }))
}

/// Run [`check_credentials`] on the blocking pool; Argon2 is CPU-bound
pub async fn authenticate(user: Option<User>, password: String) -> AuthResult<User> {
    tokio::task::spawn_blocking(move || check_credentials(user, &password))
        .await
        .map_err(|e| {
            error!("Credential check task failed: {}", e);
            AuthError::InternalServerError
        })?
}

/// Check a password against an optional user record.
///
/// Unknown users and wrong passwords produce the same error, and an unknown
/// user still pays for one hash verification.
pub fn check_credentials(user: Option<User>, password: &str) -> AuthResult<User> {
    match user {
        Some(user) if verify_password(&user.password_hash, password) => Ok(user),
        Some(_) => Err(AuthError::InvalidCredentials),
        None => {
            verify_password(placeholder_hash(), password);
            Err(AuthError::InvalidCredentials)
        }
    }
}

fn placeholder_hash() -> &'static str {
    static PLACEHOLDER: OnceLock<String> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| hash_password("placeholder-password").unwrap_or_default())
}
