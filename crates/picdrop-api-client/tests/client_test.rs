//! Client tests against the real intake router on a loopback listener.
//!
//! Run with: `cargo test -p picdrop-api-client`

use picdrop_api::setup;
use picdrop_api_client::{ApiClient, ClientError, ImageSelection, UploadForm};
use picdrop_core::{Config, ServiceConfig};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestServer {
    client: ApiClient,
    upload_dir: PathBuf,
    _temp_dir: TempDir,
}

async fn spawn_server(customize: impl FnOnce(&mut ServiceConfig)) -> TestServer {
    let temp_dir = tempfile::tempdir().unwrap();
    let upload_dir = temp_dir.path().join("uploads");
    let mut service = ServiceConfig::with_upload_dir(&upload_dir);
    customize(&mut service);

    let (_state, router) = setup::initialize_app(Config::from(service)).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = ApiClient::new(
        format!("http://{}", addr),
        "/api/upload",
        Duration::from_secs(10),
    )
    .unwrap();

    TestServer {
        client,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

fn png() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0u8; 64]);
    data
}

#[tokio::test]
async fn test_submit_returns_url_and_clears_selection() {
    let server = spawn_server(|_| {}).await;
    let mut form = UploadForm::new();
    form.select(ImageSelection::from_bytes("cat.png", png()));

    let url = form.submit(&server.client).await.unwrap();

    assert!(url.starts_with("http://localhost:3000/uploads/"));
    assert!(url.ends_with(".png"));
    assert!(form.selection().is_none());
    assert_eq!(form.last_url(), Some(url.as_str()));

    let filename = url.rsplit('/').next().unwrap();
    assert_eq!(std::fs::read(server.upload_dir.join(filename)).unwrap(), png());
}

#[tokio::test]
async fn test_submit_without_selection() {
    let server = spawn_server(|_| {}).await;
    let mut form = UploadForm::new();

    let err = form.submit(&server.client).await.unwrap_err();

    assert!(matches!(err, ClientError::NoFileSelected));
    assert_eq!(err.notification(), "Please select an image first.");
}

#[tokio::test]
async fn test_rejected_upload_keeps_selection() {
    let server = spawn_server(|c| c.enforce_file_type = true).await;
    let mut form = UploadForm::new();
    form.select(ImageSelection::from_bytes("notes.txt", b"hello".to_vec()));

    let err = form.submit(&server.client).await.unwrap_err();

    match &err {
        ClientError::Rejected { status, message } => {
            assert_eq!(*status, 400);
            assert!(message.contains("Invalid file extension"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.notification(), "Upload failed.");
    assert_eq!(form.selection().unwrap().file_name(), "notes.txt");
    assert!(form.last_url().is_none());
}

#[tokio::test]
async fn test_unreachable_server_keeps_selection_and_retry_succeeds() {
    // Reserve a port, then free it so nothing is listening there.
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed.local_addr().unwrap();
    drop(closed);

    let offline = ApiClient::new(
        format!("http://{}", closed_addr),
        "/api/upload",
        Duration::from_secs(5),
    )
    .unwrap();

    let mut form = UploadForm::new();
    form.select(ImageSelection::from_bytes("cat.png", png()));

    let err = form.submit(&offline).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.notification(), "Upload failed.");
    assert!(form.selection().is_some());

    let server = spawn_server(|_| {}).await;
    let url = form.submit(&server.client).await.unwrap();
    assert!(url.ends_with(".png"));
    assert!(form.selection().is_none());
}

#[tokio::test]
async fn test_health_probe() {
    let server = spawn_server(|_| {}).await;

    let health = server.client.health().await.unwrap();

    assert_eq!(health.status, "ok");
    assert!(health.upload_root_writable);
}
