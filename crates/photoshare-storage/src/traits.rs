//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::{ObjectInfo, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use photoshare_core::AppError;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Config(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// User metadata attached to an object (`x-amz-meta-*` on S3).
pub type ObjectMetadata = BTreeMap<String, String>;

/// Constraints a browser-form upload credential is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostConditions {
    /// Exact `Content-Type` the upload must declare
    pub content_type: String,
    /// Inclusive lower bound on the uploaded size in bytes
    pub min_content_length: u64,
    /// Inclusive upper bound on the uploaded size in bytes
    pub max_content_length: u64,
    pub expires_in: Duration,
}

/// A signed browser-form upload: POST `fields` plus the file to `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedPost {
    pub url: String,
    pub fields: BTreeMap<String, String>,
    pub expires_at: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// A handle is bound to one bucket. All backends (S3, local filesystem) implement this
/// trait so the services never depend on a concrete provider.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Name of the bucket this handle reads and writes
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Download the full contents of an object
    async fn download(&self, storage_key: &str) -> StorageResult<Bytes>;

    /// Write an object in a single put, replacing any existing object under the key
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()>;

    /// Metadata-only lookup. Fails with `StorageError::NotFound` when the key is absent.
    async fn head(&self, storage_key: &str) -> StorageResult<ObjectInfo>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        match self.head(storage_key).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// List objects whose key starts with `prefix`, in the backend's native order
    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectInfo>>;

    /// Generate a presigned/temporary URL for direct access (GET)
    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Generate a browser-form POST credential for uploading directly to `storage_key`
    async fn presigned_post(
        &self,
        storage_key: &str,
        conditions: &PostConditions,
    ) -> StorageResult<PresignedPost>;
}
