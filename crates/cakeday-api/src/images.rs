use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tokio::io::AsyncWriteExt;
use tracing::error;

use cakeday_types::api::{Claims, ImageUploadResponse};

use crate::auth::AppStateInner;
use crate::birthdays::ensure_author;
use crate::error::ApiError;

/// 5 MB upload limit for birthday images
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// POST /birthdays/{id}/image — accepts raw image bytes, saves them under
/// the upload dir, records the file name on the row. Author only.
pub async fn upload_image(
    State(state): State<Arc<AppStateInner>>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    bytes: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("image body must not be empty"));
    }

    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ApiError::PayloadTooLarge);
    }

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_birthday(id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    ensure_author(&row.author_id, &claims)?;

    let size = bytes.len() as u64;
    let file_name = format!("birthday-{}", id);

    // Ensure the upload directory exists
    tokio::fs::create_dir_all(&state.upload_dir).await.map_err(|e| {
        error!("Failed to create upload directory: {}", e);
        anyhow::anyhow!("failed to create upload directory: {}", e)
    })?;

    let file_path = state.upload_dir.join(&file_name);
    let mut file = tokio::fs::File::create(&file_path).await.map_err(|e| {
        error!("Failed to create file {}: {}", file_path.display(), e);
        anyhow::anyhow!("failed to create image file: {}", e)
    })?;
    file.write_all(&bytes).await.map_err(|e| {
        error!("Failed to write file {}: {}", file_path.display(), e);
        anyhow::anyhow!("failed to write image file: {}", e)
    })?;

    let db = state.clone();
    let stored_name = file_name.clone();
    tokio::task::spawn_blocking(move || db.db.set_birthday_image(id, &stored_name))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok((
        StatusCode::CREATED,
        Json(ImageUploadResponse {
            birthday_id: id,
            size,
        }),
    ))
}

/// GET /birthdays/{id}/image — reads the stored image from disk and returns
/// the raw bytes.
pub async fn serve_image(
    State(state): State<Arc<AppStateInner>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_birthday(id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    let file_name = row.image.ok_or(ApiError::NotFound)?;

    let file_path = state.upload_dir.join(&file_name);
    let bytes = tokio::fs::read(&file_path).await.map_err(|e| {
        error!("Failed to read file {}: {}", file_path.display(), e);
        ApiError::NotFound
    })?;

    Ok((
        [(axum::http::header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    ))
}
