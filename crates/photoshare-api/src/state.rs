use photoshare_core::Config;
use photoshare_services::{ThumbnailLocator, UploadCredentialService};
use std::sync::Arc;

/// Shared, immutable handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: UploadCredentialService,
    pub locator: ThumbnailLocator,
}
