use crate::traits::{
    ObjectMetadata, PostConditions, PresignedPost, Storage, StorageError, StorageResult,
};
use crate::{ObjectInfo, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Directory (under the bucket root) holding per-object metadata sidecars
const META_DIR: &str = ".meta";
/// Directory (under the bucket root) holding in-flight writes
const TMP_DIR: &str = ".tmp";

/// Content type and user metadata recorded for a locally stored object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectMetadata {
    pub content_type: String,
    #[serde(default)]
    pub metadata: ObjectMetadata,
}

/// Local filesystem storage implementation
///
/// Each bucket is a subdirectory of the configured root. Signed URLs are plain links
/// under `base_url` carrying an informational `expires` parameter; nothing enforces them.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    bucket: String,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory shared by all buckets (e.g., "./data")
    /// * `bucket` - Bucket name; becomes a subdirectory of `base_path`
    /// * `base_url` - Base URL files are served from (e.g., "http://localhost:3000/files")
    pub async fn new(
        base_path: impl Into<PathBuf>,
        bucket: impl Into<String>,
        base_url: impl Into<String>,
    ) -> StorageResult<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket.starts_with('.') {
            return Err(StorageError::ConfigError(format!(
                "Invalid bucket name: {:?}",
                bucket
            )));
        }

        let root = base_path.into().join(&bucket);
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            root,
            bucket,
            base_url: base_url.into(),
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Every component must be a plain name so the key cannot escape the bucket root,
    /// and the reserved sidecar directories cannot be addressed.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key must be a non-empty relative path".to_string(),
            ));
        }

        let relative = Path::new(storage_key);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid path components".to_string(),
            ));
        }

        let first = storage_key.split('/').next().unwrap_or_default();
        if first == META_DIR || first == TMP_DIR {
            return Err(StorageError::InvalidKey(format!(
                "Storage key uses reserved prefix: {}",
                first
            )));
        }

        Ok(self.root.join(relative))
    }

    fn metadata_path(&self, storage_key: &str) -> PathBuf {
        self.root
            .join(META_DIR)
            .join(format!("{}.json", storage_key))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            encoded.join("/")
        )
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_atomically(&self, path: &Path, storage_key: &str, data: &[u8]) -> StorageResult<()> {
        let tmp_dir = self.root.join(TMP_DIR);
        fs::create_dir_all(&tmp_dir).await?;
        let tmp_path = tmp_dir.join(format!("{}.partial", storage_key.replace('/', "_")));

        let mut file = fs::File::create(&tmp_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;
        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", tmp_path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", tmp_path.display(), e))
        })?;
        drop(file);

        self.ensure_parent_dir(path).await?;
        fs::rename(&tmp_path, path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to move file into {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    /// Read the content type and user metadata recorded for an object
    pub async fn read_metadata(&self, storage_key: &str) -> StorageResult<LocalObjectMetadata> {
        self.key_to_path(storage_key)?;
        let raw = match fs::read(self.metadata_path(storage_key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };
        serde_json::from_slice(&raw)
            .map_err(|e| StorageError::BackendError(format!("Corrupt metadata sidecar: {}", e)))
    }

    async fn object_info(&self, storage_key: &str, path: &Path) -> StorageResult<ObjectInfo> {
        let meta = match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(StorageError::NotFound(storage_key.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };
        let last_modified: DateTime<Utc> = meta.modified()?.into();
        Ok(ObjectInfo {
            key: storage_key.to_string(),
            size: meta.len(),
            last_modified,
        })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => {
                tracing::debug!(
                    bucket = %self.bucket,
                    key = %storage_key,
                    size_bytes = data.len() as u64,
                    "Local download successful"
                );
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        self.write_atomically(&path, storage_key, &data).await?;

        let sidecar = LocalObjectMetadata {
            content_type: content_type.to_string(),
            metadata: metadata.clone(),
        };
        let sidecar_json = serde_json::to_vec(&sidecar)
            .map_err(|e| StorageError::UploadFailed(format!("Failed to encode metadata: {}", e)))?;
        let sidecar_path = self.metadata_path(storage_key);
        self.ensure_parent_dir(&sidecar_path).await?;
        fs::write(&sidecar_path, sidecar_json).await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = data.len() as u64,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload_with_key successful"
        );

        Ok(())
    }

    async fn head(&self, storage_key: &str) -> StorageResult<ObjectInfo> {
        let path = self.key_to_path(storage_key)?;
        self.object_info(storage_key, &path).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut pending = vec![(self.root.clone(), String::new())];

        while let Some((dir, key_prefix)) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if key_prefix.is_empty() && (name == META_DIR || name == TMP_DIR) {
                    continue;
                }
                let key = format!("{}{}", key_prefix, name);
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), format!("{}/", key)));
                } else if file_type.is_file() && key.starts_with(prefix) {
                    objects.push(self.object_info(&key, &entry.path()).await?);
                }
            }
        }

        // S3 lists keys in ascending UTF-8 order; match it.
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.key_to_path(storage_key)?;
        let expires = Utc::now().timestamp() + expires_in.as_secs() as i64;
        Ok(format!("{}?expires={}", self.generate_url(storage_key), expires))
    }

    async fn presigned_post(
        &self,
        storage_key: &str,
        conditions: &PostConditions,
    ) -> StorageResult<PresignedPost> {
        self.key_to_path(storage_key)?;
        let expires_in = chrono::Duration::from_std(conditions.expires_in)
            .map_err(|e| StorageError::SigningFailed(format!("Invalid expiry: {}", e)))?;

        let fields = BTreeMap::from([
            ("key".to_string(), storage_key.to_string()),
            ("Content-Type".to_string(), conditions.content_type.clone()),
        ]);

        Ok(PresignedPost {
            url: format!("{}/{}", self.base_url.trim_end_matches('/'), self.bucket),
            fields,
            expires_at: Utc::now() + expires_in,
        })
    }
}
