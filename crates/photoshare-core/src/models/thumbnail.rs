use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Listing/HEAD view of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Query string of the thumbnail lookup endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailQuery {
    /// Source or thumbnail name; omit to list every thumbnail
    pub file_name: Option<String>,
}

impl ThumbnailQuery {
    /// The requested name, treating an empty value as absent.
    pub fn requested_name(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// One thumbnail in the listing form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailEntry {
    pub file_name: String,
    /// Signed GET URL
    pub url: String,
    pub last_modified: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThumbnailList {
    pub thumbnails: Vec<ThumbnailEntry>,
}

/// A single resolved thumbnail
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailLink {
    pub file_name: String,
    /// Signed GET URL
    pub url: String,
}

/// Response body of the thumbnail lookup endpoint: the list form when no name was
/// requested, the single form otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ThumbnailLookup {
    List(ThumbnailList),
    Single(ThumbnailLink),
}

/// What the thumbnail generator did with one source object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    /// The key already named a thumbnail; nothing was written.
    Skipped { key: String },
    Created {
        source_key: String,
        thumbnail_key: String,
        width: u32,
        height: u32,
        size_bytes: u64,
    },
}
