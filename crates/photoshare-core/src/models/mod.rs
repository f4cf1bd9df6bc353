//! Request and response models shared by the HTTP and event surfaces.

pub mod thumbnail;
pub mod upload;

pub use thumbnail::{
    ObjectInfo, ThumbnailEntry, ThumbnailLink, ThumbnailList, ThumbnailLookup, ThumbnailOutcome,
    ThumbnailQuery,
};
pub use upload::{UploadCredentialResponse, UploadRequest};
