use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use lumen_core::AppError;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::upload::{GatewayError, UploadError};

/// Body of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
    pub size: usize,
    pub mimetype: String,
    pub originalname: String,
}

/// Upload image handler
///
/// Runs the request through the upload gateway, then hands the buffered file to the
/// configured storage backend.
///
/// # Errors
/// - 400 `{"message"}` for every upload rejection (type, size, malformed form)
/// - 400 when the form carries no file under the upload field
/// - 500 when storage fails
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), GatewayError> {
    let mut multipart =
        multipart.map_err(|rejection| UploadError::Transport(rejection.body_text()))?;

    let parsed = state.gateway.accept(&mut multipart).await?;
    let file = parsed
        .file
        .ok_or_else(|| AppError::BadRequest("No image file provided".to_string()))?;

    let stored = state.storage.store(&file.mimetype, file.buffer).await?;

    tracing::info!(
        key = %stored.key,
        size = stored.size,
        mimetype = %file.mimetype,
        "Image stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: stored.url,
            key: stored.key,
            size: stored.size,
            mimetype: file.mimetype,
            originalname: file.originalname,
        }),
    ))
}
