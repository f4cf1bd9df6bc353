//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use photoshare_core::Config;
use photoshare_services::{create_storage, ThumbnailLocator, UploadCredentialService};
use std::sync::Arc;

/// Build the storage handles, services and router for `config`
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    let upload_bucket = config.require_upload_bucket()?;
    let uploads = create_storage(&config, upload_bucket)
        .await
        .context("Failed to initialize upload storage")?;
    let thumbnails = create_storage(&config, &config.thumbnail_bucket)
        .await
        .context("Failed to initialize thumbnail storage")?;

    tracing::info!(
        backend = %config.storage_backend,
        upload_bucket = %upload_bucket,
        thumbnail_bucket = %config.thumbnail_bucket,
        "Storage initialized"
    );

    let state = Arc::new(AppState {
        credentials: UploadCredentialService::new(uploads, &config),
        locator: ThumbnailLocator::new(thumbnails, &config),
        config: Arc::new(config),
    });

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
