//! Photoshare Services Layer
//!
//! The three components of the photo pipeline, each bound to the storage handles it
//! needs at construction:
//!
//! - [`UploadCredentialService`] issues browser-form upload credentials
//! - [`ThumbnailGenerator`] turns a newly stored original into a thumbnail
//! - [`ThumbnailLocator`] lists and resolves thumbnails to signed URLs
//!
//! Handlers in the API and worker crates stay thin and delegate here.

pub mod credentials;
pub mod generator;
pub mod locator;
pub mod telemetry;

pub use credentials::UploadCredentialService;
pub use generator::ThumbnailGenerator;
pub use locator::ThumbnailLocator;
pub use telemetry::{init_telemetry, LogFormat};

pub use photoshare_processing::{ThumbnailSettings, ThumbnailTransformer};
pub use photoshare_storage::{create_storage, Storage, StorageError, StorageResult};
