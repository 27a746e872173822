//! Storage setup and initialization

use anyhow::{Context, Result};
use picdrop_core::Config;
use picdrop_storage::{create_storage, UploadStore};
use std::sync::Arc;

/// Create the upload store, bootstrapping the upload root. Failure is fatal to startup.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn UploadStore>> {
    tracing::info!(
        path = %config.upload_dir().display(),
        "Initializing upload storage..."
    );

    let storage = create_storage(config).await.with_context(|| {
        format!(
            "Upload directory {} is unavailable",
            config.upload_dir().display()
        )
    })?;

    if !storage.is_writable().await {
        tracing::warn!(
            path = %config.upload_dir().display(),
            "Upload directory is read-only; uploads will fail"
        );
    }

    tracing::info!(
        public_url_example = %storage.public_url("<token>.jpg"),
        "Upload storage initialized successfully"
    );

    Ok(storage)
}
