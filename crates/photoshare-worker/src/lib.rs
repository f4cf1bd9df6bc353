//! Photoshare thumbnail worker
//!
//! Adapts object-created notifications to the thumbnail generator and reports a
//! `{statusCode, body}` result back to the invoking platform.

pub mod event;
pub mod handler;

pub use event::{EventResponse, ObjectCreatedEvent};
pub use handler::ThumbnailWorker;
