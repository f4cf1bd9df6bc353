//! Object key conventions.
//!
//! Uploaded originals are stored as `{uuid}-{fileName}`; their thumbnails live under the
//! same key with [`THUMBNAIL_PREFIX`] in front.

use crate::constants::THUMBNAIL_PREFIX;
use percent_encoding::percent_decode_str;
use uuid::Uuid;

/// Build a collision-resistant object key for a client-supplied filename.
///
/// Uniqueness is probabilistic (UUID v4); no existence check is performed.
pub fn unique_object_key(file_name: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), file_name)
}

pub fn is_thumbnail_key(key: &str) -> bool {
    key.starts_with(THUMBNAIL_PREFIX)
}

/// Key under which the thumbnail of `source_key` is written.
pub fn thumbnail_key(source_key: &str) -> String {
    format!("{}{}", THUMBNAIL_PREFIX, source_key)
}

/// Accept either a source name or a thumbnail name and return the thumbnail key.
pub fn normalize_thumbnail_name(name: &str) -> String {
    if is_thumbnail_key(name) {
        name.to_string()
    } else {
        thumbnail_key(name)
    }
}

/// Recover the storage key from its form in an object-created notification.
///
/// Notifications carry keys URL-encoded with spaces as `+`, so `+` is turned back into a
/// space before percent-decoding. Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_event_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
