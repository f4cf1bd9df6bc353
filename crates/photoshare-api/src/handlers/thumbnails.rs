use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use photoshare_core::models::{ThumbnailLookup, ThumbnailQuery};
use std::sync::Arc;

/// List every thumbnail, or resolve one by source or thumbnail name
#[utoipa::path(
    get,
    path = "/thumbnails",
    tag = "thumbnails",
    params(ThumbnailQuery),
    responses(
        (status = 200, description = "Thumbnail list, or a single thumbnail when fileName is given", body = ThumbnailLookup),
        (status = 404, description = "Thumbnail not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(operation = "get_thumbnails"))]
pub async fn get_thumbnails(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThumbnailQuery>,
) -> Result<Json<ThumbnailLookup>, HttpAppError> {
    let lookup = state.locator.lookup(&query).await?;
    Ok(Json(lookup))
}
