//! OpenAPI documentation.

use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::handlers::health::HealthResponse;
use crate::handlers::upload::UploadResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Picdrop API",
        version = "0.1.0",
        description = "Image upload intake. Files posted under the multipart field `image` are stored under a generated name and served back from the static mount path."
    ),
    paths(
        handlers::upload::upload_image,
        handlers::health::health_check,
    ),
    components(schemas(UploadResponse, ErrorResponse, HealthResponse)),
    tags(
        (name = "uploads", description = "Image upload intake"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
