//! API constants
//!
//! Route paths and the multipart field name the intake recognizes.

/// Multipart field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

/// Intake route for clients talking to the service directly.
pub const UPLOAD_ROUTE: &str = "/upload";

/// Intake route for clients behind a dev proxy that forwards `/api`.
pub const PROXIED_UPLOAD_ROUTE: &str = "/api/upload";

pub const HEALTH_ROUTE: &str = "/health";

pub const OPENAPI_ROUTE: &str = "/api/openapi.json";

/// Allowance on top of the per-file maximum for multipart framing and small text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
