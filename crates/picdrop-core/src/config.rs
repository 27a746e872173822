//! Configuration module
//!
//! Environment-driven configuration for the intake service: listener settings, the upload
//! root, the public URL layout and the intake limits.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_FILE_SIZE_MB: usize = 10;
const UPLOAD_READ_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_STATIC_MOUNT_PATH: &str = "/uploads";
const DEFAULT_ALLOWED_EXTENSIONS: &str = "jpg,jpeg,png,gif,webp,bmp";
const DEFAULT_ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp,image/bmp";

/// Paths the service routes itself; the static mount must not overlap them.
const RESERVED_ROUTES: &[&str] = &["/upload", "/api/upload", "/health", "/api/openapi.json"];

/// Listener-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
}

/// Intake service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub static_mount_path: String,
    pub max_file_size_bytes: usize,
    pub min_file_size_bytes: usize,
    pub enforce_file_type: bool,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    pub upload_read_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl From<ServiceConfig> for Config {
    fn from(config: ServiceConfig) -> Self {
        Config(Box::new(config))
    }
}

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_service().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = ServiceConfig::from_source(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_service().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_service().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_service().base.http_concurrency_limit
    }

    pub fn upload_dir(&self) -> &Path {
        &self.as_service().upload_dir
    }

    pub fn public_base_url(&self) -> &str {
        &self.as_service().public_base_url
    }

    /// Static mount path, always with a leading `/` and no trailing `/`.
    pub fn static_mount_path(&self) -> String {
        normalize_mount_path(&self.as_service().static_mount_path)
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_service().max_file_size_bytes
    }

    pub fn min_file_size_bytes(&self) -> usize {
        self.as_service().min_file_size_bytes
    }

    pub fn enforce_file_type(&self) -> bool {
        self.as_service().enforce_file_type
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_service().allowed_extensions
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_service().allowed_content_types
    }

    pub fn upload_read_timeout(&self) -> Duration {
        Duration::from_secs(self.as_service().upload_read_timeout_secs)
    }
}

impl ServiceConfig {
    /// Defaults rooted at the given upload directory. Used by tests and embedders that do not
    /// read the process environment.
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            },
            upload_dir: upload_dir.into(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            static_mount_path: DEFAULT_STATIC_MOUNT_PATH.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            min_file_size_bytes: 0,
            enforce_file_type: false,
            allowed_extensions: split_list(DEFAULT_ALLOWED_EXTENSIONS),
            allowed_content_types: split_list(DEFAULT_ALLOWED_CONTENT_TYPES),
            upload_read_timeout_secs: UPLOAD_READ_TIMEOUT_SECS,
        }
    }

    /// Build the configuration from a key lookup (the process environment in production).
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = split_list(&lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        let server_port = lookup("PORT")
            .unwrap_or_else(|| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let http_concurrency_limit = lookup("HTTP_CONCURRENCY_LIMIT")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(HTTP_CONCURRENCY_LIMIT)
            .max(1);

        let max_file_size_mb = lookup("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a whole number of megabytes"))?;
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", max_file_size_mb))?;

        let min_file_size_bytes = lookup("MIN_FILE_SIZE_BYTES")
            .unwrap_or_else(|| "0".to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("MIN_FILE_SIZE_BYTES must be a whole number"))?;

        let enforce_file_type = lookup("ENFORCE_FILE_TYPE")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let allowed_extensions = split_list(
            &lookup("ALLOWED_EXTENSIONS").unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
        );
        let allowed_content_types = split_list(
            &lookup("ALLOWED_CONTENT_TYPES")
                .unwrap_or_else(|| DEFAULT_ALLOWED_CONTENT_TYPES.to_string()),
        );

        let upload_read_timeout_secs = lookup("UPLOAD_READ_TIMEOUT_SECS")
            .unwrap_or_else(|| UPLOAD_READ_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("UPLOAD_READ_TIMEOUT_SECS must be a whole number"))?;

        Ok(Self {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
                http_concurrency_limit,
            },
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
            static_mount_path: lookup("STATIC_MOUNT_PATH")
                .unwrap_or_else(|| DEFAULT_STATIC_MOUNT_PATH.to_string()),
            max_file_size_bytes,
            min_file_size_bytes,
            enforce_file_type,
            allowed_extensions,
            allowed_content_types,
            upload_read_timeout_secs,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let environment = self.base.environment.to_lowercase();
        let is_production = environment == "production" || environment == "prod";
        if is_production && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR cannot be empty"));
        }

        if !(self.public_base_url.starts_with("http://")
            || self.public_base_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must be an absolute http(s) URL, got '{}'",
                self.public_base_url
            ));
        }

        let mount = normalize_mount_path(&self.static_mount_path);
        if mount == "/" || mount.split('/').any(|segment| segment == "..") {
            return Err(anyhow::anyhow!(
                "STATIC_MOUNT_PATH must be a non-root path such as /uploads, got '{}'",
                self.static_mount_path
            ));
        }
        if let Some(route) = RESERVED_ROUTES
            .iter()
            .find(|route| mount_overlaps(&mount, route))
        {
            return Err(anyhow::anyhow!(
                "STATIC_MOUNT_PATH '{}' overlaps the {} route",
                self.static_mount_path,
                route
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("Max file size cannot be 0"));
        }

        if self.min_file_size_bytes > self.max_file_size_bytes {
            return Err(anyhow::anyhow!(
                "MIN_FILE_SIZE_BYTES ({}) exceeds the maximum file size ({} bytes)",
                self.min_file_size_bytes,
                self.max_file_size_bytes
            ));
        }

        if self.enforce_file_type
            && (self.allowed_extensions.is_empty() || self.allowed_content_types.is_empty())
        {
            return Err(anyhow::anyhow!(
                "ENFORCE_FILE_TYPE=true requires ALLOWED_EXTENSIONS and ALLOWED_CONTENT_TYPES"
            ));
        }

        if self.upload_read_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Upload read timeout cannot be 0"));
        }

        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn normalize_mount_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{}", trimmed)
}

fn mount_overlaps(mount: &str, route: &str) -> bool {
    let under = |path: &str, prefix: &str| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    };
    mount == route || under(mount, route) || under(route, mount)
}
