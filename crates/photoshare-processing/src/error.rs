use photoshare_core::AppError;
use thiserror::Error;

/// Image processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The input bytes are not an image in a supported format
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode JPEG: {0}")]
    Encode(String),

    #[error("Invalid thumbnail settings: {0}")]
    InvalidSettings(String),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Decode(msg) => AppError::ImageDecode(msg),
            ProcessingError::Encode(msg) => AppError::ImageProcessing(msg),
            ProcessingError::InvalidSettings(msg) => AppError::Config(msg),
        }
    }
}
