//! Image upload handler for update and cover images.
//!
//! Accepts a multipart file, sniffs the real content type from magic
//! bytes (the declared type is advisory only), stores it under the
//! upload directory with a UUID name, and returns a durable URL the
//! caller embeds in an `image` update or an event's cover.

use crate::api::ApiError;
use crate::AppState;
use axum::{
    extract::{Extension, Multipart},
    response::Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// Allowed MIME types for image uploads.
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Determines file extension from content type.
fn ext_from_content_type(ct: &str) -> &'static str {
    match ct {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Detects content type from the first bytes of a file.
fn detect_content_type(data: &[u8]) -> Option<&'static str> {
    if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
        Some("image/jpeg")
    } else if data.len() >= 8 && data[..8] == [137, 80, 78, 71, 13, 10, 26, 10] {
        Some("image/png")
    } else if data.len() >= 4 && &data[..4] == b"GIF8" {
        Some("image/gif")
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Response body for a successful upload.
#[derive(Debug, serde::Serialize)]
pub struct UploadResponse {
    /// Public URL of the stored file.
    pub url: String,
    /// Opaque identifier (the stored file's UUID stem).
    pub id: String,
}

/// Handler for `POST /api/upload`.
pub async fn upload_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
        .ok_or_else(|| ApiError::BadRequest("missing file field".to_string()))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;

    if data.is_empty() {
        return Err(ApiError::BadRequest("empty upload".to_string()));
    }
    if data.len() > state.upload_max_bytes {
        return Err(ApiError::BadRequest(format!(
            "upload exceeds maximum size of {} bytes",
            state.upload_max_bytes
        )));
    }

    // Trust the bytes, not the declared type.
    let content_type = detect_content_type(&data)
        .filter(|ct| ALLOWED_CONTENT_TYPES.contains(ct))
        .ok_or_else(|| ApiError::BadRequest("unsupported image format".to_string()))?;

    let id = Uuid::new_v4().to_string();
    let file_name = format!("{}.{}", id, ext_from_content_type(content_type));

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| ApiError::InternalServerError(format!("failed to create upload dir: {e}")))?;

    let path = std::path::Path::new(&state.upload_dir).join(&file_name);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| ApiError::InternalServerError(format!("failed to store upload: {e}")))?;

    tracing::info!(file = %file_name, content_type, size = data.len(), "stored upload");

    Ok(Json(UploadResponse {
        url: format!("/uploads/{file_name}"),
        id,
    }))
}
