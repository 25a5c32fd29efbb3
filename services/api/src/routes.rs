//! API service routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::services::ServeDir;

use crate::{
    AppState,
    middleware::{auth_middleware, expose_error_details},
    uploads::UPLOADS_PATH,
};

pub mod cars;
pub mod upload;

/// Multipart framing allowance on top of the file size cap
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD;

    let protected_routes = Router::new()
        .route("/cars", post(cars::create_car))
        .route("/cars/:id", put(cars::update_car).delete(cars::delete_car))
        .route(
            "/upload",
            post(upload::upload_photo).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/cars", get(cars::list_cars))
        .route("/cars/:id", get(cars::get_car))
        .merge(protected_routes)
        .nest_service(UPLOADS_PATH, ServeDir::new(state.uploads.dir()))
        .fallback(not_found);

    let router = if state.dev_mode {
        router.layer(middleware::from_fn(expose_error_details))
    } else {
        router
    };

    router.with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "service": "api-service",
            "database": database
        })),
    )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Resource not found" })),
    )
}
