use crate::error::{ErrorResponse, HttpAppError, JsonBody};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use photoshare_core::models::{UploadCredentialResponse, UploadRequest};
use std::sync::Arc;

/// Issue a browser-form credential for uploading one file directly to storage
#[utoipa::path(
    post,
    path = "/upload-url",
    tag = "uploads",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Upload credential issued", body = UploadCredentialResponse),
        (status = 400, description = "fileName or fileType missing", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(operation = "create_upload_url"))]
pub async fn create_upload_url(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<UploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let credential = state.credentials.issue(&request).await?;
    Ok((StatusCode::OK, Json(credential)))
}
