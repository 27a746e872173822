//! Picdrop Core Library
//!
//! This crate provides the configuration and error types shared by the intake service,
//! the storage layer and the client tooling.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
