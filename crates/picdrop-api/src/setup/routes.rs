//! Route configuration and setup

use crate::api_doc::openapi_json;
use crate::constants::{
    HEALTH_ROUTE, MULTIPART_OVERHEAD_BYTES, OPENAPI_ROUTE, PROXIED_UPLOAD_ROUTE, UPLOAD_ROUTE,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use picdrop_core::Config;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // The per-file limit is enforced while streaming; this caps the whole body so extra
    // fields cannot be used to send unbounded data.
    let body_limit = config
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let upload_routes = Router::new()
        .route(UPLOAD_ROUTE, post(handlers::upload::upload_image))
        .route(PROXIED_UPLOAD_ROUTE, post(handlers::upload::upload_image))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit));

    let mount_path = config.static_mount_path();
    tracing::info!(
        mount_path = %mount_path,
        path = %config.upload_dir().display(),
        "Serving stored uploads"
    );

    let http_concurrency_limit = config.http_concurrency_limit();
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = Router::new()
        .route(HEALTH_ROUTE, get(handlers::health::health_check))
        .route(OPENAPI_ROUTE, get(openapi_json))
        .merge(upload_routes)
        .nest_service(&mount_path, ServeDir::new(config.upload_dir()))
        .layer(GlobalConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
