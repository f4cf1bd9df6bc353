//! Thumbnail generation for newly stored originals

use photoshare_core::constants::{
    METADATA_ORIGINAL_KEY, METADATA_THUMBNAIL_SIZE, THUMBNAIL_CONTENT_TYPE,
};
use photoshare_core::keys::{decode_event_key, is_thumbnail_key, thumbnail_key};
use photoshare_core::models::ThumbnailOutcome;
use photoshare_core::AppError;
use photoshare_processing::{ThumbnailSettings, ThumbnailTransformer};
use photoshare_storage::{ObjectMetadata, Storage};
use std::sync::Arc;
use std::time::Instant;

/// Writes a thumbnail of each source object into the thumbnail bucket.
///
/// Source keys arrive in their notification encoding and are decoded here. Keys that
/// already name a thumbnail are skipped, which keeps a shared source/thumbnail bucket
/// from feeding on its own output.
#[derive(Clone)]
pub struct ThumbnailGenerator {
    thumbnails: Arc<dyn Storage>,
    transformer: ThumbnailTransformer,
}

impl ThumbnailGenerator {
    pub fn new(thumbnails: Arc<dyn Storage>, settings: ThumbnailSettings) -> Self {
        Self {
            thumbnails,
            transformer: ThumbnailTransformer::new(settings),
        }
    }

    /// Handle that thumbnails are written to
    pub fn thumbnail_storage(&self) -> &Arc<dyn Storage> {
        &self.thumbnails
    }

    #[tracing::instrument(skip(self, source), fields(bucket = %source.bucket()))]
    pub async fn process(
        &self,
        source: &dyn Storage,
        raw_key: &str,
    ) -> Result<ThumbnailOutcome, AppError> {
        let key = decode_event_key(raw_key);

        if is_thumbnail_key(&key) {
            tracing::info!(key = %key, "Skipping thumbnail processing for an existing thumbnail");
            return Ok(ThumbnailOutcome::Skipped { key });
        }

        let start = Instant::now();
        let original = source.download(&key).await?;

        let transformer = self.transformer;
        let thumbnail = tokio::task::spawn_blocking(move || transformer.generate(&original))
            .await
            .map_err(|e| AppError::Internal(format!("Thumbnail task panicked: {e}")))??;

        let target_key = thumbnail_key(&key);
        let size_bytes = thumbnail.data.len() as u64;
        let metadata = ObjectMetadata::from([
            (METADATA_ORIGINAL_KEY.to_string(), key.clone()),
            (
                METADATA_THUMBNAIL_SIZE.to_string(),
                self.transformer.settings().size_label(),
            ),
        ]);

        self.thumbnails
            .upload_with_key(&target_key, thumbnail.data, THUMBNAIL_CONTENT_TYPE, &metadata)
            .await?;

        tracing::info!(
            source_key = %key,
            thumbnail_key = %target_key,
            width = thumbnail.width,
            height = thumbnail.height,
            size_bytes = size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail created"
        );

        Ok(ThumbnailOutcome::Created {
            source_key: key,
            thumbnail_key: target_key,
            width: thumbnail.width,
            height: thumbnail.height,
            size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use photoshare_storage::LocalStorage;
    use std::io::Cursor;

    struct Fixture {
        _dir: tempfile::TempDir,
        uploads: LocalStorage,
        thumbnails: LocalStorage,
        generator: ThumbnailGenerator,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let uploads = LocalStorage::new(dir.path(), "photo-uploads", "http://localhost/files")
            .await
            .unwrap();
        let thumbnails =
            LocalStorage::new(dir.path(), "photo-sharing-thumbnails", "http://localhost/files")
                .await
                .unwrap();
        let generator =
            ThumbnailGenerator::new(Arc::new(thumbnails.clone()), ThumbnailSettings::default());
        Fixture {
            _dir: dir,
            uploads,
            thumbnails,
            generator,
        }
    }

    fn jpeg(width: u32, height: u32) -> Bytes {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 60, 30])));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        Bytes::from(buffer)
    }

    #[tokio::test]
    async fn test_process_writes_thumbnail_with_metadata() {
        let f = fixture().await;
        f.uploads
            .upload_with_key("vacation.jpg", jpeg(800, 600), "image/jpeg", &ObjectMetadata::new())
            .await
            .unwrap();

        let outcome = f.generator.process(&f.uploads, "vacation.jpg").await.unwrap();

        assert_eq!(
            outcome,
            ThumbnailOutcome::Created {
                source_key: "vacation.jpg".to_string(),
                thumbnail_key: "thumb-vacation.jpg".to_string(),
                width: 150,
                height: 113,
                size_bytes: f.thumbnails.head("thumb-vacation.jpg").await.unwrap().size,
            }
        );

        let recorded = f.thumbnails.read_metadata("thumb-vacation.jpg").await.unwrap();
        assert_eq!(recorded.content_type, "image/jpeg");
        assert_eq!(recorded.metadata["original-key"], "vacation.jpg");
        assert_eq!(recorded.metadata["thumbnail-size"], "150x150");

        let data = f.thumbnails.download("thumb-vacation.jpg").await.unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert!(decoded.width() <= 150 && decoded.height() <= 150);
    }

    #[tokio::test]
    async fn test_process_skips_thumbnail_keys() {
        let f = fixture().await;

        let outcome = f
            .generator
            .process(&f.uploads, "thumb-vacation.jpg")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ThumbnailOutcome::Skipped {
                key: "thumb-vacation.jpg".to_string()
            }
        );
        assert!(f.thumbnails.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_decodes_event_key() {
        let f = fixture().await;
        f.uploads
            .upload_with_key("my photo(1).jpg", jpeg(40, 40), "image/jpeg", &ObjectMetadata::new())
            .await
            .unwrap();

        f.generator
            .process(&f.uploads, "my+photo%281%29.jpg")
            .await
            .unwrap();

        assert!(f.thumbnails.exists("thumb-my photo(1).jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_process_reports_missing_source() {
        let f = fixture().await;

        let err = f.generator.process(&f.uploads, "gone.jpg").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!f.thumbnails.exists("thumb-gone.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_process_rejects_non_images() {
        let f = fixture().await;
        f.uploads
            .upload_with_key(
                "notes.jpg",
                Bytes::from_static(b"plain text, not pixels"),
                "image/jpeg",
                &ObjectMetadata::new(),
            )
            .await
            .unwrap();

        let err = f.generator.process(&f.uploads, "notes.jpg").await.unwrap_err();

        assert_eq!(err.error_type(), "DecodeError");
        assert!(!f.thumbnails.exists("thumb-notes.jpg").await.unwrap());
    }
}
