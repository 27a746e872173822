//! Client-side selection state.

use std::path::{Path, PathBuf};

use crate::{ApiClient, ClientError};

/// A file chosen by the user, loaded into memory.
///
/// Owns the bytes for as long as it is selected; replacing or clearing the selection
/// releases them.
#[derive(Debug, Clone)]
pub struct ImageSelection {
    path: Option<PathBuf>,
    file_name: String,
    content_type: &'static str,
    data: Vec<u8>,
}

impl ImageSelection {
    /// Load a file from disk. No type or size checks happen client-side.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| ClientError::ReadFile {
                path: path.clone(),
                source,
            })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let mut selection = Self::from_bytes(file_name, data);
        selection.path = Some(path);
        Ok(selection)
    }

    pub fn from_bytes(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name);
        Self {
            path: None,
            file_name,
            content_type,
            data,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// The upload form: at most one selected file and the last URL received.
#[derive(Debug, Default)]
pub struct UploadForm {
    selection: Option<ImageSelection>,
    last_url: Option<String>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a file, releasing any previous selection.
    pub fn select(&mut self, selection: ImageSelection) {
        if let Some(previous) = self.selection.replace(selection) {
            tracing::debug!(file_name = %previous.file_name(), "Replaced selection");
        }
    }

    pub fn clear(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&ImageSelection> {
        self.selection.as_ref()
    }

    /// URL of the most recent successful upload.
    pub fn last_url(&self) -> Option<&str> {
        self.last_url.as_deref()
    }

    /// Submit the current selection.
    ///
    /// On success the selection is cleared and the URL recorded. On failure the selection
    /// is kept so the user can retry without choosing the file again.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<String, ClientError> {
        let selection = self.selection.as_ref().ok_or(ClientError::NoFileSelected)?;

        match client.submit_image(selection).await {
            Ok(url) => {
                tracing::info!(url = %url, file_name = %selection.file_name(), "Upload succeeded");
                self.selection = None;
                self.last_url = Some(url.clone());
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file_name = %selection.file_name(),
                    "Upload failed; keeping selection"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_common_image_types() {
        assert_eq!(guess_content_type("photo.JPG"), "image/jpeg");
        assert_eq!(guess_content_type("a.png"), "image/png");
        assert_eq!(guess_content_type("noext"), "application/octet-stream");
        assert_eq!(guess_content_type("notes.txt"), "application/octet-stream");
    }

    #[test]
    fn selecting_replaces_previous_file() {
        let mut form = UploadForm::new();
        form.select(ImageSelection::from_bytes("one.png", vec![1]));
        form.select(ImageSelection::from_bytes("two.png", vec![2, 2]));

        let selection = form.selection().unwrap();
        assert_eq!(selection.file_name(), "two.png");
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn clear_drops_selection() {
        let mut form = UploadForm::new();
        form.select(ImageSelection::from_bytes("one.png", vec![1]));
        form.clear();
        assert!(form.selection().is_none());
    }

    #[tokio::test]
    async fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageSelection::load(dir.path().join("missing.jpg")).await;
        assert!(matches!(result, Err(ClientError::ReadFile { .. })));
    }

    #[tokio::test]
    async fn load_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let selection = ImageSelection::load(&path).await.unwrap();
        assert_eq!(selection.file_name(), "cat.gif");
        assert_eq!(selection.content_type(), "image/gif");
        assert_eq!(selection.data(), b"GIF89a");
        assert_eq!(selection.path(), Some(path.as_path()));
    }
}
