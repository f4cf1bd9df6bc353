//! Wire format of object-created notifications and of the handler result

use serde::{Deserialize, Serialize};

/// Object-created notification as delivered by S3
///
/// Only the fields the worker reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObjectCreatedEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectRef {
    /// Key in notification encoding (`+` for spaces, percent-escapes)
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl EventRecord {
    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    pub fn raw_key(&self) -> &str {
        &self.s3.object.key
    }
}

/// Result returned to the invoking platform
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl EventResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn failure(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
