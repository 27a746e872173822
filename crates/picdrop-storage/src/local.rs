use crate::naming;
use crate::traits::{
    IncomingFile, StagedUpload, StorageError, StorageResult, StoredFile, TempFileGuard,
    UploadStore,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

const CHUNK_SIZE: usize = 64 * 1024;
const HEAD_LEN: usize = 16;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    mount_path: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating the upload root if it is missing.
    ///
    /// Creation is idempotent, so concurrent service instances racing on the same root are
    /// harmless.
    ///
    /// # Arguments
    /// * `base_path` - Upload root (e.g., "/var/lib/picdrop/uploads")
    /// * `base_url` - Public base address (e.g., "http://localhost:3000")
    /// * `mount_path` - Static mount path the root is served under (e.g., "/uploads")
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
        mount_path: impl AsRef<str>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::DirectoryUnavailable(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let metadata = fs::metadata(&base_path).await.map_err(|e| {
            StorageError::DirectoryUnavailable(format!(
                "Failed to access upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;
        if !metadata.is_dir() {
            return Err(StorageError::DirectoryUnavailable(format!(
                "{} is not a directory",
                base_path.display()
            )));
        }

        let mount_path = format!("/{}", mount_path.as_ref().trim_matches('/'));

        tracing::info!(
            path = %base_path.display(),
            mount_path = %mount_path,
            "Upload directory ready"
        );

        Ok(LocalStorage {
            base_path,
            base_url: base_url.into(),
            mount_path,
        })
    }

    /// Resolve a stored filename to its path under the upload root.
    ///
    /// Stored names are flat, so anything that could address another directory or a
    /// staging file is rejected.
    pub fn path_for(&self, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
            || filename.starts_with('.')
        {
            return Err(StorageError::InvalidKey(
                "Filename contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(filename))
    }

    /// Read a stored file back.
    pub async fn read(&self, filename: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(filename)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    pub async fn exists(&self, filename: &str) -> StorageResult<bool> {
        let path = self.path_for(filename)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn generate_url(&self, filename: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            self.mount_path,
            filename
        )
    }
}

#[async_trait]
impl UploadStore for LocalStorage {
    async fn stage(
        &self,
        incoming: IncomingFile,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        max_bytes: u64,
    ) -> StorageResult<StagedUpload> {
        let filename = naming::generate_filename(&incoming.original_filename);
        let temp_path = self.base_path.join(format!(".{}.part", filename));
        let start = std::time::Instant::now();

        // Declared before the file so the handle is closed before the guard removes the path.
        let temp = TempFileGuard::new(temp_path.clone());

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut head = Vec::with_capacity(HEAD_LEN);
        let mut size: u64 = 0;

        loop {
            let read = reader
                .read(&mut buffer)
                .await
                .map_err(StorageError::SourceRead)?;
            if read == 0 {
                break;
            }

            size += read as u64;
            if size > max_bytes {
                tracing::debug!(
                    filename = %filename,
                    max_bytes,
                    "Upload exceeded size limit while streaming"
                );
                return Err(StorageError::TooLarge { max: max_bytes });
            }

            if head.len() < HEAD_LEN {
                let take = (HEAD_LEN - head.len()).min(read);
                head.extend_from_slice(&buffer[..take]);
            }

            file.write_all(&buffer[..read]).await.map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to write file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        file.flush().await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to flush file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to sync file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        drop(file);

        tracing::debug!(
            path = %temp_path.display(),
            filename = %filename,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(StagedUpload {
            filename,
            size,
            head,
            incoming,
            temp,
        })
    }

    async fn commit(&self, mut staged: StagedUpload) -> StorageResult<StoredFile> {
        let final_path = self.path_for(&staged.filename)?;
        let temp_path = staged
            .temp
            .path()
            .map(Path::to_path_buf)
            .ok_or_else(|| StorageError::WriteFailed("Upload already committed".to_string()))?;

        fs::rename(&temp_path, &final_path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to move {} into place: {}",
                temp_path.display(),
                e
            ))
        })?;
        staged.temp.disarm();

        let url = self.generate_url(&staged.filename);

        tracing::info!(
            path = %final_path.display(),
            filename = %staged.filename,
            original_filename = %staged.incoming.original_filename,
            size_bytes = staged.size,
            "Local storage upload successful"
        );

        Ok(StoredFile {
            filename: staged.filename.clone(),
            path: final_path,
            url,
            size: staged.size,
        })
    }

    fn public_url(&self, filename: &str) -> String {
        self.generate_url(filename)
    }

    async fn is_writable(&self) -> bool {
        match fs::metadata(&self.base_path).await {
            Ok(metadata) => metadata.is_dir() && !metadata.permissions().readonly(),
            Err(_) => false,
        }
    }
}
