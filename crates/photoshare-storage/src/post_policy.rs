//! Browser-form POST policies signed with AWS Signature Version 4.
//!
//! The object store client only signs query-string URLs, so the POST form credential is
//! assembled here: a JSON policy document listing every condition S3 must enforce, its
//! base64 encoding, and an HMAC-SHA256 signature over that encoding.

use crate::traits::{PostConditions, PresignedPost, StorageError, StorageResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Map, Value};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const TERMINATOR: &str = "aws4_request";

/// Access key material used to sign a policy.
#[derive(Debug, Clone, Copy)]
pub struct SigningCredential<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    /// Present for temporary (STS) credentials, e.g. inside Lambda
    pub session_token: Option<&'a str>,
}

/// Target of a POST upload.
#[derive(Debug, Clone, Copy)]
pub struct PostTarget<'a> {
    /// Form action URL
    pub url: &'a str,
    pub bucket: &'a str,
    pub region: &'a str,
    pub key: &'a str,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Derive the SigV4 signing key for one day, region and service.
pub fn derive_signing_key(
    secret_access_key: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Vec<u8> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_access_key).as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, TERMINATOR.as_bytes())
}

/// Hex signature of a base64-encoded policy.
pub fn sign_policy(signing_key: &[u8], encoded_policy: &str) -> String {
    hex::encode(hmac_sha256(signing_key, encoded_policy.as_bytes()))
}

/// Build the signed form fields for a POST upload issued at `now`.
pub fn build_presigned_post(
    target: PostTarget<'_>,
    conditions: &PostConditions,
    credential: SigningCredential<'_>,
    now: DateTime<Utc>,
) -> StorageResult<PresignedPost> {
    let expires_in = chrono::Duration::from_std(conditions.expires_in)
        .map_err(|e| StorageError::SigningFailed(format!("Invalid expiry: {}", e)))?;
    let expires_at = now + expires_in;

    let date_stamp = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let scope = format!("{}/{}/{}/{}", date_stamp, target.region, SERVICE, TERMINATOR);

    let mut fields = BTreeMap::new();
    fields.insert("key".to_string(), target.key.to_string());
    fields.insert("Content-Type".to_string(), conditions.content_type.clone());
    fields.insert("x-amz-algorithm".to_string(), ALGORITHM.to_string());
    fields.insert(
        "x-amz-credential".to_string(),
        format!("{}/{}", credential.access_key_id, scope),
    );
    fields.insert("x-amz-date".to_string(), amz_date);
    if let Some(token) = credential.session_token {
        fields.insert("x-amz-security-token".to_string(), token.to_string());
    }

    let mut policy_conditions = vec![json!({ "bucket": target.bucket })];
    for (name, value) in &fields {
        let mut condition = Map::new();
        condition.insert(name.clone(), Value::String(value.clone()));
        policy_conditions.push(Value::Object(condition));
    }
    policy_conditions.push(json!([
        "content-length-range",
        conditions.min_content_length,
        conditions.max_content_length
    ]));

    let policy = json!({
        "expiration": expires_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "conditions": policy_conditions,
    });
    let policy_json = serde_json::to_vec(&policy)
        .map_err(|e| StorageError::SigningFailed(format!("Failed to encode policy: {}", e)))?;
    let encoded_policy = STANDARD.encode(policy_json);

    let signing_key = derive_signing_key(
        credential.secret_access_key,
        &date_stamp,
        target.region,
        SERVICE,
    );
    let signature = sign_policy(&signing_key, &encoded_policy);

    fields.insert("policy".to_string(), encoded_policy);
    fields.insert("x-amz-signature".to_string(), signature);

    Ok(PresignedPost {
        url: target.url.to_string(),
        fields,
        expires_at,
    })
}
