//! Picdrop API Library
//!
//! This crate provides the HTTP intake handlers, error rendering, and application setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod state;
pub mod validation;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use handlers::health::HealthResponse;
pub use handlers::upload::UploadResponse;
pub use state::AppState;
