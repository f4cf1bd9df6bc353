//! Photoshare API Library
//!
//! HTTP surface of the upload credential issuer and the thumbnail locator.

pub mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
