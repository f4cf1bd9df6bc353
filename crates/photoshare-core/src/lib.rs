//! Photoshare Core Library
//!
//! This crate provides the configuration, error taxonomy, request/response models and
//! object key conventions shared by every photoshare component.

pub mod config;
pub mod constants;
pub mod error;
pub mod keys;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
