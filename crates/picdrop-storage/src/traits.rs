//! Storage abstraction trait
//!
//! This module defines the `UploadStore` trait that the intake service writes through, and
//! the values that flow across it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// The bytes could not be read from the client. Not a storage fault.
    #[error("Failed to read upload source: {0}")]
    SourceRead(#[source] std::io::Error),

    #[error("File exceeds maximum size of {max} bytes")]
    TooLarge { max: u64 },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Client-declared attributes of an incoming file part.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Untrusted; only used to derive the stored extension.
    pub original_filename: String,
    /// Declared by the client, not verified.
    pub content_type: Option<String>,
}

impl IncomingFile {
    pub fn new(original_filename: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            original_filename: original_filename.into(),
            content_type,
        }
    }
}

/// Removes a temporary file when dropped unless disarmed.
#[derive(Debug)]
pub(crate) struct TempFileGuard {
    path: Option<PathBuf>,
}

impl TempFileGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            // Synchronous so the file is gone before the request finishes; one unlink is cheap.
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Discarded staged upload");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove staged upload"
                    );
                }
            }
        }
    }
}

/// An upload fully written to a temporary file but not yet visible under its final name.
///
/// Dropping a staged upload without committing it removes the temporary file.
#[derive(Debug)]
pub struct StagedUpload {
    pub(crate) filename: String,
    pub(crate) size: u64,
    pub(crate) head: Vec<u8>,
    pub(crate) incoming: IncomingFile,
    pub(crate) temp: TempFileGuard,
}

impl StagedUpload {
    /// Final filename the upload will be committed under.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Leading bytes of the content (at most 16), for signature checks.
    pub fn head(&self) -> &[u8] {
        &self.head
    }

    pub fn original_filename(&self) -> &str {
        &self.incoming.original_filename
    }

    pub fn content_type(&self) -> Option<&str> {
        self.incoming.content_type.as_deref()
    }
}

/// A committed upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub url: String,
    pub size: u64,
}

/// Upload storage abstraction
///
/// Writing is split in two steps so that the caller can reject an upload after all of its
/// bytes have arrived (a second file part, a failed signature check) without anything ever
/// becoming visible under a final name.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Stream `reader` to a temporary file, failing with `TooLarge` once more than
    /// `max_bytes` have been read.
    async fn stage(
        &self,
        incoming: IncomingFile,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        max_bytes: u64,
    ) -> StorageResult<StagedUpload>;

    /// Make a staged upload visible under its final name.
    async fn commit(&self, staged: StagedUpload) -> StorageResult<StoredFile>;

    /// Public URL for a stored filename.
    fn public_url(&self, filename: &str) -> String;

    /// Whether the upload root currently accepts writes.
    async fn is_writable(&self) -> bool;

    /// Stage and commit an in-memory payload.
    async fn store(&self, original_filename: &str, data: &[u8]) -> StorageResult<StoredFile> {
        let mut reader = data;
        let staged = self
            .stage(IncomingFile::new(original_filename, None), &mut reader, u64::MAX)
            .await?;
        self.commit(staged).await
    }
}
