pub mod health;
pub mod thumbnails;
pub mod upload_url;
