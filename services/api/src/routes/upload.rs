//! Photo upload handler

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    uploads::image_extension,
};

/// Form field carrying the photo
const PHOTO_FIELD: &str = "photo";

/// Response for a stored photo
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub message: String,
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        debug!("Malformed multipart body: {}", e);
        ApiError::BadRequest("Malformed upload".to_string())
    }
}

/// Store one image sent as the `photo` field of a multipart form
pub async fn upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut multipart =
        multipart.map_err(|_| ApiError::BadRequest("No file uploaded".to_string()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let extension = image_extension(&file_name, field.content_type()).ok_or_else(|| {
            ApiError::BadRequest(
                "Only image files are allowed (jpeg, jpg, png, webp, gif)".to_string(),
            )
        })?;

        let data = field.bytes().await.map_err(multipart_error)?;
        if data.is_empty() {
            return Err(ApiError::BadRequest("No file uploaded".to_string()));
        }
        if data.len() > state.uploads.max_bytes() {
            return Err(ApiError::PayloadTooLarge);
        }

        let stored = state
            .uploads
            .save(extension, &data)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store upload: {}", e)))?;
        info!("Stored photo {} ({} bytes)", stored, data.len());

        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok());

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                url: state.uploads.url_for(&stored, host),
                message: "File uploaded successfully".to_string(),
            }),
        ));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
