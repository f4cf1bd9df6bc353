/// Upper bound on request bodies; credential requests are tiny JSON documents.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

pub const UPLOAD_URL_PATH: &str = "/upload-url";
pub const THUMBNAILS_PATH: &str = "/thumbnails";
pub const HEALTH_PATH: &str = "/health";
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";
