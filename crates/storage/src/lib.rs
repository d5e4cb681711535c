//! Blob storage for uploaded media.
//!
//! Records only keep a [`BlobHandle`](videostream_model::models::BlobHandle);
//! the bytes live in a [`BlobStorage`] backend rooted somewhere outside the
//! database. Uploads land in one of the
//! [`MediaArea`](videostream_model::models::MediaArea) directories.

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::BlobStorage;
pub use crate::path::{sanitize_file_name, validate as validate_path};
use std::sync::Arc;

pub type StorageHandle = Arc<dyn BlobStorage + Send + Sync>;
