//! HTTP client for the Picdrop intake service.
//!
//! `ApiClient` posts a single image under the multipart field `image` and returns the URL
//! the server hands back. `UploadForm` holds the user's current selection and applies the
//! retry policy: a failed submission keeps the selection, a successful one clears it.

pub mod error;
pub mod form;

pub use error::ClientError;
pub use form::{ImageSelection, UploadForm};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_UPLOAD_PATH: &str = "/api/upload";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Multipart field the intake service reads the file from.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
struct UploadBody {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Result of the service health probe.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub upload_root_writable: bool,
}

/// HTTP client for the intake service.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    upload_path: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, upload_path: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_path: format!("/{}", upload_path.trim_start_matches('/')),
        })
    }

    /// Create client from environment: PICDROP_API_URL, PICDROP_UPLOAD_PATH and
    /// PICDROP_CLIENT_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("PICDROP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let upload_path = std::env::var("PICDROP_UPLOAD_PATH")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_PATH.to_string());
        let timeout_secs = match std::env::var("PICDROP_CLIENT_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("PICDROP_CLIENT_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self::new(base_url, &upload_path, Duration::from_secs(timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn upload_url(&self) -> String {
        self.build_url(&self.upload_path)
    }

    /// Submit one image and return the URL it is served at.
    ///
    /// No retries: a failure is reported once and left to the caller.
    pub async fn submit_image(&self, selection: &ImageSelection) -> Result<String, ClientError> {
        let part = reqwest::multipart::Part::bytes(selection.data().to_vec())
            .file_name(selection.file_name().to_string())
            .mime_str(selection.content_type())?;
        let form = reqwest::multipart::Form::new().part(IMAGE_FIELD, part);

        let url = self.upload_url();
        tracing::debug!(
            url = %url,
            file_name = %selection.file_name(),
            size_bytes = selection.len(),
            "Submitting image"
        );

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadBody = serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", e, body)))?;

        Ok(parsed.url)
    }

    /// Probe `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.client.get(self.build_url("/health")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json::<HealthStatus>().await?)
    }
}
