//! Configuration module
//!
//! Configuration is read from the environment once at process start and then shared
//! immutably through `Arc<Config>`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PRESIGNED_URL_EXPIRY_SECS, DEFAULT_THUMBNAIL_BUCKET,
    DEFAULT_THUMBNAIL_MAX_DIMENSION, DEFAULT_THUMBNAIL_QUALITY, MIN_UPLOAD_BYTES,
};
use crate::error::AppError;
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 3000;
const DEFAULT_REGION: &str = "us-east-1";
const LOCAL_STORAGE_PATH: &str = "./data";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:3000/files";

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    // Storage configuration
    pub storage_backend: StorageBackend,
    /// Destination of direct uploads; only the API needs it.
    pub upload_bucket: Option<String>,
    pub thumbnail_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Upload policy
    pub max_upload_bytes: u64,
    pub presigned_url_expiry_secs: u64,
    // Thumbnail generation
    pub thumbnail_max_dimension: u32,
    pub thumbnail_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            storage_backend: StorageBackend::S3,
            upload_bucket: None,
            thumbnail_bucket: DEFAULT_THUMBNAIL_BUCKET.to_string(),
            s3_region: DEFAULT_REGION.to_string(),
            s3_endpoint: None,
            local_storage_path: LOCAL_STORAGE_PATH.to_string(),
            local_storage_base_url: LOCAL_STORAGE_BASE_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            presigned_url_expiry_secs: DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            thumbnail_max_dimension: DEFAULT_THUMBNAIL_MAX_DIMENSION,
            thumbnail_quality: DEFAULT_THUMBNAIL_QUALITY,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let cors_origins = parse_list(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        let storage_backend = match non_empty_var("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => defaults.storage_backend,
        };

        let thumbnail_bucket = non_empty_var("THUMBNAIL_BUCKET")
            .or_else(|| non_empty_var("TARGET_BUCKET"))
            .unwrap_or(defaults.thumbnail_bucket);

        let s3_region = non_empty_var("S3_REGION")
            .or_else(|| non_empty_var("AWS_REGION"))
            .unwrap_or(defaults.s3_region);

        let config = Config {
            environment,
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            cors_origins,
            storage_backend,
            upload_bucket: non_empty_var("UPLOAD_BUCKET"),
            thumbnail_bucket,
            s3_region,
            s3_endpoint: non_empty_var("S3_ENDPOINT"),
            local_storage_path: non_empty_var("LOCAL_STORAGE_PATH")
                .unwrap_or(defaults.local_storage_path),
            local_storage_base_url: non_empty_var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or(defaults.local_storage_base_url),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            presigned_url_expiry_secs: parse_var(
                "PRESIGNED_URL_EXPIRY_SECS",
                defaults.presigned_url_expiry_secs,
            ),
            thumbnail_max_dimension: parse_var(
                "THUMBNAIL_MAX_DIMENSION",
                defaults.thumbnail_max_dimension,
            ),
            thumbnail_quality: parse_var("THUMBNAIL_QUALITY", defaults.thumbnail_quality),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        if self.presigned_url_expiry_secs == 0 {
            return Err(anyhow::anyhow!("PRESIGNED_URL_EXPIRY_SECS must be positive"));
        }
        if self.max_upload_bytes < MIN_UPLOAD_BYTES {
            return Err(anyhow::anyhow!("MAX_UPLOAD_BYTES must be at least 1"));
        }
        if self.thumbnail_max_dimension == 0 {
            return Err(anyhow::anyhow!("THUMBNAIL_MAX_DIMENSION must be positive"));
        }
        if !(1..=100).contains(&self.thumbnail_quality) {
            return Err(anyhow::anyhow!("THUMBNAIL_QUALITY must be between 1 and 100"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn presigned_url_expiry(&self) -> Duration {
        Duration::from_secs(self.presigned_url_expiry_secs)
    }

    /// The upload bucket, or a configuration error when it is not set.
    pub fn require_upload_bucket(&self) -> Result<&str, AppError> {
        self.upload_bucket
            .as_deref()
            .ok_or_else(|| AppError::Config("UPLOAD_BUCKET not configured".to_string()))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    non_empty_var(name)
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
