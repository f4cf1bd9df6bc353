use crate::post_policy::{build_presigned_post, PostTarget, SigningCredential};
use crate::traits::{
    ObjectMetadata, PostConditions, PresignedPost, Storage, StorageError, StorageResult,
};
use crate::{ObjectInfo, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::{future, TryStreamExt};
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, CredentialProvider, ObjectMeta, ObjectStore, ObjectStoreExt,
    PutOptions, PutPayload, Result as ObjectResult,
};
use std::borrow::Cow;
use std::time::Duration;

/// S3 storage implementation bound to one bucket
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        // Credentials come from the environment (static keys, web identity, or the
        // Lambda/ECS/EC2 metadata endpoints).
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Form action URL for browser POST uploads
    ///
    /// For AWS S3 this is the virtual-hosted bucket endpoint; S3-compatible providers get
    /// path-style `{endpoint}/{bucket}/`.
    fn form_action_url(&self) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/", endpoint.trim_end_matches('/'), self.bucket)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/", self.bucket, self.region)
        }
    }

    /// Object path for a key exactly as clients upload it.
    ///
    /// `Path::from` would percent-encode characters such as `[`, `%` and `#`, addressing a
    /// different S3 object than the one named in the POST form or the event.
    fn object_path(storage_key: &str) -> StorageResult<Path> {
        Path::parse(storage_key)
            .map_err(|e| StorageError::InvalidKey(format!("{}: {}", storage_key, e)))
    }

    fn object_info(meta: ObjectMeta) -> ObjectInfo {
        ObjectInfo {
            key: meta.location.to_string(),
            size: meta.size as u64,
            last_modified: meta.last_modified,
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        let start = std::time::Instant::now();
        let location = Self::object_path(storage_key)?;

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes)
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()> {
        let size = data.len() as u64;
        let location = Self::object_path(storage_key)?;
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        for (name, value) in metadata {
            attributes.insert(
                Attribute::Metadata(Cow::Owned(name.clone())),
                value.clone().into(),
            );
        }
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(data), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload_with_key failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload_with_key successful"
        );

        Ok(())
    }

    async fn head(&self, storage_key: &str) -> StorageResult<ObjectInfo> {
        let location = Self::object_path(storage_key)?;
        match self.store.head(&location).await {
            Ok(meta) => Ok(Self::object_info(meta)),
            Err(ObjectStoreError::NotFound { .. }) => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
        let start = std::time::Instant::now();

        let objects = list_key_prefix(&self.store, prefix).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                prefix = %prefix,
                "S3 list failed"
            );
            e
        })?;

        let matching: Vec<ObjectInfo> = objects.into_iter().map(Self::object_info).collect();

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = matching.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(matching)
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Self::object_path(storage_key)?;
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn presigned_post(
        &self,
        storage_key: &str,
        conditions: &PostConditions,
    ) -> StorageResult<PresignedPost> {
        let credential = self
            .store
            .credentials()
            .get_credential()
            .await
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;

        let url = self.form_action_url();
        let post = build_presigned_post(
            PostTarget {
                url: &url,
                bucket: &self.bucket,
                region: &self.region,
                key: storage_key,
            },
            conditions,
            SigningCredential {
                access_key_id: &credential.key_id,
                secret_access_key: &credential.secret_key,
                session_token: credential.token.as_deref(),
            },
            Utc::now(),
        )?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            expires_at = %post.expires_at,
            "Generated presigned POST"
        );

        Ok(post)
    }
}

/// All objects whose key starts with `prefix`, in key order.
///
/// object_store prefixes are whole path segments, so a key prefix such as "thumb-" cannot
/// be pushed down. Listing starts after the prefix instead and stops at the first key
/// past it, as S3 lists keys in ascending order. A key equal to the prefix itself is not
/// listed.
async fn list_key_prefix(store: &dyn ObjectStore, prefix: &str) -> StorageResult<Vec<ObjectMeta>> {
    let stream = if prefix.is_empty() {
        store.list(None)
    } else {
        let offset = S3Storage::object_path(prefix)?;
        store.list_with_offset(None, &offset)
    };

    stream
        .try_take_while(|meta| {
            future::ready(Ok::<_, ObjectStoreError>(
                meta.location.as_ref().starts_with(prefix),
            ))
        })
        .try_collect()
        .await
        .map_err(|e| StorageError::BackendError(e.to_string()))
}
