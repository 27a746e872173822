use std::path::PathBuf;

/// Upload client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// The message shown to the user. Only two outcomes are distinguished.
    pub fn notification(&self) -> &'static str {
        match self {
            ClientError::NoFileSelected => "Please select an image first.",
            _ => "Upload failed.",
        }
    }
}
