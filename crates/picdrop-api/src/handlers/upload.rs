use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use picdrop_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::multipart::receive_image_part;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Absolute URL the stored image is served at
    pub url: String,
}

/// Upload image handler
///
/// Streams the single `image` part of a multipart body to the upload root under a generated
/// name and returns the public URL of the stored file. Also mounted at `/upload`.
///
/// # Errors
/// - `AppError::MissingFilePart` - No file under `image` (or no multipart body at all)
/// - `AppError::MultipleFileParts` - More than one file under `image`
/// - `AppError::PayloadTooLarge` - File exceeds the size limit
/// - `AppError::RequestTimeout` - Body not received within the read timeout
/// - `AppError::WriteFailure` - The file could not be written
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "No file uploaded or invalid input", body = ErrorResponse),
        (status = 408, description = "Upload body not received in time", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Upload could not be stored", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    store_upload(&state, multipart)
        .await
        .map(Json)
        .map_err(|e| e.with_details(state.expose_error_details))
}

async fn store_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadResponse, HttpAppError> {
    let start = Instant::now();

    // A request that is not multipart at all carries no file either.
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Request body is not multipart");
        AppError::MissingFilePart
    })?;

    let max_bytes = state.config.max_file_size_bytes() as u64;
    let staged = tokio::time::timeout(
        state.config.upload_read_timeout(),
        receive_image_part(
            &mut multipart,
            state.storage.as_ref(),
            &state.validator,
            max_bytes,
        ),
    )
    .await
    .map_err(|_| AppError::RequestTimeout)??;

    state.validator.validate_staged(&staged)?;

    let stored = state.storage.commit(staged).await?;

    tracing::info!(
        filename = %stored.filename,
        size_bytes = stored.size,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Image uploaded"
    );

    Ok(UploadResponse { url: stored.url })
}
