//! Fixed values of the storage layout and upload policy.

/// Literal prefix that marks a key as a generated thumbnail.
pub const THUMBNAIL_PREFIX: &str = "thumb-";

/// Thumbnails are always re-encoded as JPEG.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

pub const DEFAULT_THUMBNAIL_MAX_DIMENSION: u32 = 150;
pub const DEFAULT_THUMBNAIL_QUALITY: u8 = 85;

/// Smallest accepted upload, in bytes.
pub const MIN_UPLOAD_BYTES: u64 = 1;
/// 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Lifetime of upload and retrieval credentials.
pub const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 3600;

pub const DEFAULT_THUMBNAIL_BUCKET: &str = "photo-sharing-thumbnails";

/// Object metadata keys written alongside each thumbnail.
pub const METADATA_ORIGINAL_KEY: &str = "original-key";
pub const METADATA_THUMBNAIL_SIZE: &str = "thumbnail-size";

/// Client-facing messages that are part of the wire contract.
pub const MISSING_UPLOAD_FIELDS_MESSAGE: &str = "fileName and fileType are required";
pub const THUMBNAIL_NOT_FOUND_MESSAGE: &str = "Thumbnail not found";
