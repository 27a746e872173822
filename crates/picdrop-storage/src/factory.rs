use crate::{LocalStorage, StorageResult, UploadStore};
use picdrop_core::Config;
use std::sync::Arc;

/// Create the upload store described by the configuration.
///
/// The upload root is created if missing; failure to do so is fatal at startup.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn UploadStore>> {
    let storage = LocalStorage::new(
        config.upload_dir(),
        config.public_base_url(),
        config.static_mount_path(),
    )
    .await?;
    Ok(Arc::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use picdrop_core::config::ServiceConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_missing_upload_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let config = Config::from(ServiceConfig::with_upload_dir(&root));

        let storage = create_storage(&config).await.unwrap();

        assert!(root.is_dir());
        assert!(storage.is_writable().await);
        assert_eq!(
            storage.public_url("x.png"),
            "http://localhost:3000/uploads/x.png"
        );
    }
}
