//! Upload credential issuing

use photoshare_core::constants::{MIN_UPLOAD_BYTES, MISSING_UPLOAD_FIELDS_MESSAGE};
use photoshare_core::keys::unique_object_key;
use photoshare_core::models::{UploadCredentialResponse, UploadRequest};
use photoshare_core::{AppError, Config};
use photoshare_storage::{PostConditions, Storage};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

/// Issues browser-form POST credentials for direct uploads into the upload bucket.
///
/// No bytes pass through this service; the client posts the file straight to storage.
#[derive(Clone)]
pub struct UploadCredentialService {
    storage: Arc<dyn Storage>,
    max_upload_bytes: u64,
    expires_in: Duration,
}

impl UploadCredentialService {
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self {
            storage,
            max_upload_bytes: config.max_upload_bytes,
            expires_in: config.presigned_url_expiry(),
        }
    }

    #[tracing::instrument(skip(self, request), fields(bucket = %self.storage.bucket()))]
    pub async fn issue(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadCredentialResponse, AppError> {
        let missing = || AppError::InvalidInput(MISSING_UPLOAD_FIELDS_MESSAGE.to_string());

        request.validate().map_err(|_| missing())?;
        let (file_name, file_type) = match (&request.file_name, &request.file_type) {
            (Some(file_name), Some(file_type)) => (file_name, file_type),
            _ => return Err(missing()),
        };

        let key = unique_object_key(file_name);
        let conditions = PostConditions {
            content_type: file_type.clone(),
            min_content_length: MIN_UPLOAD_BYTES,
            max_content_length: self.max_upload_bytes,
            expires_in: self.expires_in,
        };

        let post = self.storage.presigned_post(&key, &conditions).await?;

        tracing::info!(
            key = %key,
            content_type = %file_type,
            expires_at = %post.expires_at,
            "Issued upload credential"
        );

        Ok(UploadCredentialResponse {
            upload_url: post.url,
            fields: post.fields,
            file_name: key,
            expires_at: post.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use photoshare_core::models::ObjectInfo;
    use photoshare_core::StorageBackend;
    use photoshare_storage::{
        LocalStorage, ObjectMetadata, PresignedPost, StorageError, StorageResult,
    };
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Records the POST conditions it is asked to sign
    #[derive(Default)]
    struct RecordingStorage {
        posts: Mutex<Vec<(String, PostConditions)>>,
    }

    #[async_trait]
    impl Storage for RecordingStorage {
        fn bucket(&self) -> &str {
            "photo-uploads"
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::S3
        }

        async fn download(&self, key: &str) -> StorageResult<Bytes> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn upload_with_key(
            &self,
            _key: &str,
            _data: Bytes,
            _content_type: &str,
            _metadata: &ObjectMetadata,
        ) -> StorageResult<()> {
            Ok(())
        }

        async fn head(&self, key: &str) -> StorageResult<ObjectInfo> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn list(&self, _prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
            Ok(Vec::new())
        }

        async fn get_presigned_url(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
            Ok(format!("https://photo-uploads.example/{}", key))
        }

        async fn presigned_post(
            &self,
            key: &str,
            conditions: &PostConditions,
        ) -> StorageResult<PresignedPost> {
            self.posts
                .lock()
                .unwrap()
                .push((key.to_string(), conditions.clone()));
            Ok(PresignedPost {
                url: "https://photo-uploads.s3.us-east-1.amazonaws.com/".to_string(),
                fields: BTreeMap::from([
                    ("key".to_string(), key.to_string()),
                    ("Content-Type".to_string(), conditions.content_type.clone()),
                ]),
                expires_at: chrono::Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_issue_binds_key_type_and_size_range() {
        let storage = Arc::new(RecordingStorage::default());
        let service = UploadCredentialService::new(storage.clone(), &Config::default());

        let response = service
            .issue(&UploadRequest::new("cat.png", "image/png"))
            .await
            .unwrap();

        assert!(!response.upload_url.is_empty());
        assert!(response.file_name.ends_with("-cat.png"));
        assert_ne!(response.file_name, "cat.png");
        assert_eq!(response.fields["Content-Type"], "image/png");
        assert_eq!(response.fields["key"], response.file_name);

        let posts = storage.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let (key, conditions) = &posts[0];
        assert_eq!(key, &response.file_name);
        assert_eq!(conditions.min_content_length, 1);
        assert_eq!(conditions.max_content_length, 10_485_760);
        assert_eq!(conditions.expires_in, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_missing_fields_fail_without_signing() {
        let storage = Arc::new(RecordingStorage::default());
        let service = UploadCredentialService::new(storage.clone(), &Config::default());

        for request in [
            UploadRequest::default(),
            UploadRequest::new("", "image/png"),
            UploadRequest::new("cat.png", ""),
            UploadRequest {
                file_name: Some("cat.png".to_string()),
                file_type: None,
            },
        ] {
            let err = service.issue(&request).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == MISSING_UPLOAD_FIELDS_MESSAGE));
        }
        assert!(storage.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_issue_with_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "photo-uploads", "http://localhost:3000/files")
            .await
            .unwrap();
        let service = UploadCredentialService::new(Arc::new(storage), &Config::default());

        let response = service
            .issue(&UploadRequest::new("beach day.jpg", "image/jpeg"))
            .await
            .unwrap();

        assert_eq!(response.upload_url, "http://localhost:3000/files/photo-uploads");
        assert!(response.file_name.ends_with("-beach day.jpg"));
        assert_eq!(response.fields["Content-Type"], "image/jpeg");
    }
}
