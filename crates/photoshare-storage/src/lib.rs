//! Photoshare Storage Library
//!
//! This crate provides the `Storage` abstraction over a single bucket and its
//! implementations for S3 (and S3-compatible providers) and the local filesystem.
//!
//! # Bucket model
//!
//! A `Storage` handle is bound to exactly one bucket. Uploads and thumbnails usually live
//! in different buckets, so callers create one handle per bucket through
//! [`create_storage`]. The local backend maps each bucket to a subdirectory of its root.
//!
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod post_policy;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::{LocalObjectMetadata, LocalStorage};
pub use photoshare_core::models::ObjectInfo;
pub use photoshare_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectMetadata, PostConditions, PresignedPost, Storage, StorageError, StorageResult};
