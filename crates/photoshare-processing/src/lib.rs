//! Photoshare Processing Library
//!
//! Pure, synchronous image work for thumbnail generation. Nothing here touches storage
//! or the async runtime; callers move the work onto a blocking thread.

pub mod compression;
pub mod error;
pub mod thumbnail;

pub use error::{ProcessingError, ProcessingResult};
pub use thumbnail::{fit_within, Thumbnail, ThumbnailSettings, ThumbnailTransformer};
