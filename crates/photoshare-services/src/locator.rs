//! Thumbnail lookup and signed retrieval URLs

use photoshare_core::constants::{THUMBNAIL_NOT_FOUND_MESSAGE, THUMBNAIL_PREFIX};
use photoshare_core::keys::normalize_thumbnail_name;
use photoshare_core::models::{
    ThumbnailEntry, ThumbnailLink, ThumbnailList, ThumbnailLookup, ThumbnailQuery,
};
use photoshare_core::{AppError, Config};
use photoshare_storage::{Storage, StorageError};
use std::sync::Arc;
use std::time::Duration;

/// Read-only view of the thumbnail bucket
#[derive(Clone)]
pub struct ThumbnailLocator {
    storage: Arc<dyn Storage>,
    expires_in: Duration,
}

impl ThumbnailLocator {
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self {
            storage,
            expires_in: config.presigned_url_expiry(),
        }
    }

    /// List form when no name is requested, single form otherwise
    pub async fn lookup(&self, query: &ThumbnailQuery) -> Result<ThumbnailLookup, AppError> {
        match query.requested_name() {
            Some(name) => self.locate(name).await.map(ThumbnailLookup::Single),
            None => self.list().await.map(ThumbnailLookup::List),
        }
    }

    /// Every thumbnail in the bucket with a fresh signed URL, in listing order
    #[tracing::instrument(skip(self), fields(bucket = %self.storage.bucket()))]
    pub async fn list(&self) -> Result<ThumbnailList, AppError> {
        let objects = self.storage.list(THUMBNAIL_PREFIX).await?;

        let mut thumbnails = Vec::with_capacity(objects.len());
        for object in objects {
            let url = self
                .storage
                .get_presigned_url(&object.key, self.expires_in)
                .await?;
            thumbnails.push(ThumbnailEntry {
                file_name: object.key,
                url,
                last_modified: object.last_modified,
                size: object.size,
            });
        }

        tracing::debug!(count = thumbnails.len(), "Listed thumbnails");
        Ok(ThumbnailList { thumbnails })
    }

    /// Resolve a source or thumbnail name to a signed URL for the thumbnail
    #[tracing::instrument(skip(self), fields(bucket = %self.storage.bucket()))]
    pub async fn locate(&self, name: &str) -> Result<ThumbnailLink, AppError> {
        let key = normalize_thumbnail_name(name);

        match self.storage.head(&key).await {
            Ok(_) => {}
            Err(StorageError::NotFound(_)) => {
                return Err(AppError::NotFound(THUMBNAIL_NOT_FOUND_MESSAGE.to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        let url = self.storage.get_presigned_url(&key, self.expires_in).await?;
        Ok(ThumbnailLink { file_name: key, url })
    }
}
