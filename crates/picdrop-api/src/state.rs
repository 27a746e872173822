//! Application state shared by the intake handlers.

use crate::validation::UploadValidator;
use picdrop_core::Config;
use picdrop_storage::UploadStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn UploadStore>,
    pub validator: UploadValidator,
    /// Include internal error text in error bodies (never in production)
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn UploadStore>) -> Self {
        let validator = UploadValidator::from_config(&config);
        let expose_error_details = !config.is_production();
        Self {
            config,
            storage,
            validator,
            expose_error_details,
        }
    }
}
