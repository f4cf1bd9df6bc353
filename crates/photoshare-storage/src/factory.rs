#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use photoshare_core::Config;
use std::sync::Arc;

/// Create a storage handle for `bucket` on the configured backend
pub async fn create_storage(config: &Config, bucket: &str) -> StorageResult<Arc<dyn Storage>> {
    if bucket.trim().is_empty() {
        return Err(StorageError::ConfigError(
            "Bucket name must not be empty".to_string(),
        ));
    }

    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::new(
                bucket.to_string(),
                config.s3_region.clone(),
                config.s3_endpoint.clone(),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                config.local_storage_path.clone(),
                bucket,
                config.local_storage_base_url.clone(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
