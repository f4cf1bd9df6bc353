//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use photoshare_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Photoshare API",
        version = "0.1.0",
        description = "Direct-to-storage photo uploads and thumbnail lookup. Clients request a signed upload form, post the photo straight to object storage, and later fetch thumbnails through short-lived signed URLs."
    ),
    paths(
        handlers::upload_url::create_upload_url,
        handlers::thumbnails::get_thumbnails,
        handlers::health::health_check,
    ),
    components(schemas(
        models::UploadRequest,
        models::UploadCredentialResponse,
        models::ThumbnailLookup,
        models::ThumbnailList,
        models::ThumbnailEntry,
        models::ThumbnailLink,
        error::ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Upload credentials"),
        (name = "thumbnails", description = "Thumbnail lookup"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
