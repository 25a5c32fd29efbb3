//! Car catalog handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use common::jwt::Claims;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::{CarListParams, CarListResponse, CarResponse},
    validation::{validate_car_update, validate_new_car},
};

/// Parse a path id; anything but a positive integer names no car
pub fn parse_car_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    payload.map(|Json(body)| body).map_err(|e| {
        debug!("Rejected request body: {}", e);
        ApiError::Validation(vec!["Request body must be a JSON object".to_string()])
    })
}

/// List cars with filters and pagination
pub async fn list_cars(
    State(state): State<AppState>,
    Query(params): Query<CarListParams>,
) -> ApiResult<Json<CarListResponse>> {
    let page = state
        .car_repository
        .list(
            &params.filters(),
            params.include_inactive(),
            params.page_request(),
        )
        .await?;

    Ok(Json(CarListResponse::from(page)))
}

/// Get a car by ID
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CarResponse>> {
    let id = parse_car_id(&id).ok_or_else(ApiError::car_not_found)?;

    let car = state
        .car_repository
        .find_by_id(id)
        .await?
        .ok_or_else(ApiError::car_not_found)?;

    Ok(Json(CarResponse::from(car)))
}

/// Create a car listing
pub async fn create_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let new_car = validate_new_car(&json_body(payload)?).map_err(ApiError::Validation)?;

    let car = state.car_repository.create(&new_car).await?;
    info!("Car {} created by {}", car.id, claims.username);

    Ok((StatusCode::CREATED, Json(CarResponse::from(car))))
}

/// Replace every field of a car listing
pub async fn update_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<CarResponse>> {
    let id = parse_car_id(&id).ok_or_else(ApiError::car_not_found)?;
    let (car, status) =
        validate_car_update(&json_body(payload)?).map_err(ApiError::Validation)?;

    let car = state
        .car_repository
        .update(id, &car, status)
        .await?
        .ok_or_else(ApiError::car_not_found)?;
    info!("Car {} updated by {}", car.id, claims.username);

    Ok(Json(CarResponse::from(car)))
}

/// Permanently delete a car listing
pub async fn delete_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_car_id(&id).ok_or_else(ApiError::car_not_found)?;

    if !state.car_repository.delete(id).await? {
        return Err(ApiError::car_not_found());
    }
    info!("Car {} deleted by {}", id, claims.username);

    Ok(Json(json!({ "message": "Car deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_car_id() {
        assert_eq!(parse_car_id("42"), Some(42));
        assert_eq!(parse_car_id("0"), None);
        assert_eq!(parse_car_id("-3"), None);
        assert_eq!(parse_car_id("abc"), None);
        assert_eq!(parse_car_id("4.5"), None);
        assert_eq!(parse_car_id(""), None);
        assert_eq!(parse_car_id("99999999999999999999"), None);
    }
}
