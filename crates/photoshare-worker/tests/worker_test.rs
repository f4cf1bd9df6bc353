//! Event handling tests against the local storage backend.
//!
//! Run with: `cargo test -p photoshare-worker --test worker_test`

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use photoshare_core::{Config, StorageBackend};
use photoshare_storage::{LocalStorage, ObjectMetadata, Storage};
use photoshare_worker::{EventResponse, ObjectCreatedEvent, ThumbnailWorker};
use serde_json::json;
use std::io::Cursor;
use tempfile::TempDir;

const UPLOAD_BUCKET: &str = "photo-uploads";
const BASE_URL: &str = "http://localhost:3000/files";

struct Fixture {
    temp_dir: TempDir,
    config: Config,
    worker: ThumbnailWorker,
}

impl Fixture {
    async fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage_backend: StorageBackend::Local,
            local_storage_path: temp_dir.path().to_string_lossy().into_owned(),
            local_storage_base_url: BASE_URL.to_string(),
            ..Config::default()
        };
        let worker = ThumbnailWorker::from_config(config.clone()).await.unwrap();
        Self {
            temp_dir,
            config,
            worker,
        }
    }

    async fn bucket(&self, name: &str) -> LocalStorage {
        LocalStorage::new(self.temp_dir.path(), name, BASE_URL)
            .await
            .unwrap()
    }

    async fn uploads(&self) -> LocalStorage {
        self.bucket(UPLOAD_BUCKET).await
    }

    async fn thumbnails(&self) -> LocalStorage {
        self.bucket(&self.config.thumbnail_bucket).await
    }

    async fn put_original(&self, key: &str, data: Vec<u8>) {
        self.uploads()
            .await
            .upload_with_key(key, Bytes::from(data), "image/jpeg", &ObjectMetadata::new())
            .await
            .unwrap();
    }

    async fn handle(&self, keys: &[&str]) -> EventResponse {
        let records: Vec<_> = keys
            .iter()
            .map(|key| {
                json!({
                    "eventName": "ObjectCreated:Post",
                    "s3": {
                        "bucket": { "name": UPLOAD_BUCKET },
                        "object": { "key": key }
                    }
                })
            })
            .collect();
        let event: ObjectCreatedEvent =
            serde_json::from_value(json!({ "Records": records })).unwrap();
        self.worker.handle_event(event).await
    }
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

fn photo(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([70, 130, 180]))),
        ImageFormat::Jpeg,
    )
}

#[tokio::test]
async fn test_creates_thumbnail_for_new_photo() {
    let f = Fixture::new().await;
    f.put_original("vacation.jpg", photo(1024, 768)).await;

    let response = f.handle(&["vacation.jpg"]).await;

    assert_eq!(
        response,
        EventResponse {
            status_code: 200,
            body: "Thumbnail created: thumb-vacation.jpg".to_string(),
        }
    );

    let thumbnails = f.thumbnails().await;
    let metadata = thumbnails.read_metadata("thumb-vacation.jpg").await.unwrap();
    assert_eq!(metadata.content_type, "image/jpeg");
    assert_eq!(metadata.metadata["original-key"], "vacation.jpg");

    let data = thumbnails.download("thumb-vacation.jpg").await.unwrap();
    assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::Jpeg);
    let thumb = image::load_from_memory(&data).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (150, 113));
}

#[tokio::test]
async fn test_thumbnail_keys_are_skipped() {
    let f = Fixture::new().await;
    f.put_original("thumb-vacation.jpg", photo(400, 400)).await;

    let response = f.handle(&["thumb-vacation.jpg"]).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.body,
        "Skipping thumbnail processing for an existing thumbnail"
    );
    assert!(f.thumbnails().await.list("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transparent_png_renders_on_white() {
    let f = Fixture::new().await;
    let logo = encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 200, Rgba([0, 0, 0, 0]))),
        ImageFormat::Png,
    );
    f.put_original("logo.png", logo).await;

    let response = f.handle(&["logo.png"]).await;
    assert!(response.is_success(), "{:?}", response);

    let data = f.thumbnails().await.download("thumb-logo.png").await.unwrap();
    let thumb = image::load_from_memory(&data).unwrap();
    assert!(!thumb.color().has_alpha());
    let rgb = thumb.to_rgb8();
    assert!(rgb.pixels().all(|p| p.0.iter().all(|&c| c > 245)));
}

#[tokio::test]
async fn test_transparent_gif_renders_on_white() {
    let f = Fixture::new().await;
    let sticker = encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 0]))),
        ImageFormat::Gif,
    );
    f.put_original("sticker.gif", sticker).await;

    let response = f.handle(&["sticker.gif"]).await;
    assert!(response.is_success(), "{:?}", response);

    let data = f.thumbnails().await.download("thumb-sticker.gif").await.unwrap();
    assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::Jpeg);
    let thumb = image::load_from_memory(&data).unwrap();
    assert!(!thumb.color().has_alpha());
    assert!(thumb.to_rgb8().pixels().all(|p| p.0.iter().all(|&c| c > 245)));
}

#[tokio::test]
async fn test_encoded_keys_are_decoded() {
    let f = Fixture::new().await;
    f.put_original("my photo(1).jpg", photo(200, 300)).await;

    let response = f.handle(&["my+photo%281%29.jpg"]).await;

    assert_eq!(response.body, "Thumbnail created: thumb-my photo(1).jpg");
    assert!(f.thumbnails().await.exists("thumb-my photo(1).jpg").await.unwrap());
}

#[tokio::test]
async fn test_processes_every_record() {
    let f = Fixture::new().await;
    f.put_original("a.jpg", photo(300, 300)).await;
    f.put_original("b.jpg", photo(600, 200)).await;

    let response = f.handle(&["a.jpg", "b.jpg"]).await;

    assert!(response.is_success());
    let thumbnails = f.thumbnails().await;
    assert!(thumbnails.exists("thumb-a.jpg").await.unwrap());
    assert!(thumbnails.exists("thumb-b.jpg").await.unwrap());
}

#[tokio::test]
async fn test_failed_record_names_key_and_others_still_run() {
    let f = Fixture::new().await;
    f.put_original("good.jpg", photo(300, 300)).await;
    f.put_original("broken.jpg", b"not an image".to_vec()).await;

    let response = f.handle(&["broken.jpg", "good.jpg"]).await;

    assert_eq!(response.status_code, 500);
    assert!(response.body.starts_with("Error creating thumbnail"));
    assert!(response.body.contains("broken.jpg"));
    assert!(!response.body.contains("good.jpg"));
    assert!(f.thumbnails().await.exists("thumb-good.jpg").await.unwrap());
}

#[tokio::test]
async fn test_single_failure_reports_error() {
    let f = Fixture::new().await;

    let response = f.handle(&["missing.jpg"]).await;

    assert_eq!(response.status_code, 500);
    assert!(response.body.starts_with("Error creating thumbnail: "));
}

#[tokio::test]
async fn test_event_without_records_is_rejected() {
    let f = Fixture::new().await;

    let response = f
        .worker
        .handle_event(ObjectCreatedEvent::default())
        .await;

    assert_eq!(response.status_code, 400);
}
