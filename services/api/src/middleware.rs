//! Request middleware: bearer token validation and dev-mode error details

use axum::{
    body::{self, Body},
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ErrorDetails},
    state::AppState,
};

/// Authentication middleware
///
/// Missing header, empty token, bad signature and expiry all end in the same
/// 401. On success the decoded `common::jwt::Claims` are placed in the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;
    let token = bearer.token().trim();
    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Copy the diagnostic of a 500 response into its JSON body as `details`
///
/// Only installed when the service runs in development mode.
pub async fn expose_error_details(req: Request<Body>, next: Next) -> Response {
    let response = next.run(req).await;
    let (mut parts, body) = response.into_parts();

    let Some(ErrorDetails(details)) = parts.extensions.remove::<ErrorDetails>() else {
        return Response::from_parts(parts, body);
    };

    let bytes = match body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to buffer error response: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let body = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(serde_json::Value::Object(mut json)) => {
            json.insert("details".to_string(), serde_json::Value::String(details));
            Body::from(serde_json::Value::Object(json).to_string())
        }
        _ => Body::from(bytes),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, body)
}
