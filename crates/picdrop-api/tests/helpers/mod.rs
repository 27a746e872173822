//! Test helpers: build the real application over a temporary upload root.
//!
//! Run from workspace root: `cargo test -p picdrop-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use picdrop_api::setup;
use picdrop_core::{Config, ServiceConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEST_BASE_URL: &str = "http://localhost:3000";

/// Test application: server and the owned upload root.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Every entry in the upload root, staging files included.
    pub fn stored_files(&self) -> Vec<String> {
        list_dir(&self.upload_dir)
    }

    /// Path a returned URL maps to under the upload root.
    pub fn path_for_url(&self, url: &str) -> PathBuf {
        self.upload_dir.join(filename_from_url(url))
    }
}

/// Setup test app with default configuration.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, adjusting the configuration first.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut ServiceConfig)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let upload_dir = temp_dir.path().join("uploads");

    let mut service = ServiceConfig::with_upload_dir(&upload_dir);
    service.public_base_url = TEST_BASE_URL.to_string();
    customize(&mut service);

    let (_state, router) = setup::initialize_app(Config::from(service))
        .await
        .expect("Failed to initialize app");

    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read upload directory")
        .map(|entry| {
            entry
                .expect("Failed to read directory entry")
                .file_name()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    names.sort();
    names
}

/// Final path segment of a returned URL.
pub fn filename_from_url(url: &str) -> &str {
    url.rsplit('/').next().expect("URL has no path segment")
}

/// A form with a single `image` file part.
pub fn image_form(filename: &str, mime: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("image", Part::bytes(data).file_name(filename).mime_type(mime))
}
