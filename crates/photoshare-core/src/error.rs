//! Error types module
//!
//! Every failure in photoshare is expressed as an `AppError`. The `ErrorMetadata` impl
//! below is the only place that decides which HTTP status (or event failure status) a
//! kind of error maps to; the HTTP and event surfaces only render what it reports.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for bad client data such as undecodable images
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::ImageDecode(_) => (500, "IMAGE_DECODE_ERROR", false, LogLevel::Warn),
        AppError::ImageProcessing(_) => (500, "IMAGE_PROCESSING_ERROR", true, LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Config(_) => (500, "CONFIGURATION_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "ValidationError",
            AppError::NotFound(_) => "NotFoundError",
            AppError::ImageDecode(_) => "DecodeError",
            AppError::ImageProcessing(_)
            | AppError::Storage(_)
            | AppError::Config(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => "InternalError",
        }
    }

    /// Full message including the source chain, for logs and non-production responses.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = match self {
            AppError::InternalWithSource { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::ImageDecode(ref msg) => msg.clone(),
            AppError::ImageProcessing(_) => "Failed to process image".to_string(),
            AppError::Storage(_) => "Internal server error".to_string(),
            AppError::Config(_) => "Internal server error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
