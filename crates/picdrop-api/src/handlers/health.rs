//! Health check handler.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub upload_root_writable: bool,
}

/// Liveness plus a check that the upload root still accepts writes.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let upload_root_writable = state.storage.is_writable().await;
    if !upload_root_writable {
        tracing::warn!(
            path = %state.config.upload_dir().display(),
            "Upload root is not writable"
        );
    }

    Json(HealthResponse {
        status: "ok".to_string(),
        upload_root_writable,
    })
}
