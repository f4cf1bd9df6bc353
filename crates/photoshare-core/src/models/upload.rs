use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

/// Request for a direct-upload credential
///
/// Both fields are optional at the serde level so that a missing field is reported as a
/// validation failure (400) rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Name the client wants to store the file under
    #[validate(required, length(min = 1))]
    pub file_name: Option<String>,
    /// MIME type the upload will be constrained to
    #[validate(required, length(min = 1))]
    pub file_type: Option<String>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            file_type: Some(file_type.into()),
        }
    }
}

/// Browser-form upload credential
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadCredentialResponse {
    /// Form action URL
    #[serde(rename = "uploadURL")]
    pub upload_url: String,
    /// Form fields the client must send along with the file
    pub fields: BTreeMap<String, String>,
    /// Generated object key (`{uuid}-{fileName}`)
    pub file_name: String,
    /// When the credential stops being accepted
    pub expires_at: DateTime<Utc>,
}
