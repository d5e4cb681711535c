//! Blob storage trait and implementations.
//!
//! This module defines the [`BlobStorage`] trait, a unified interface for the
//! handful of operations records need from wherever their media files live.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
use crate::error::{ErrorKind, Result};
use crate::path::{candidates, validate as validate_path};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;
use videostream_model::models::BlobHandle;

/// How many numbered alternatives [`BlobStorage::store`] tries before giving up.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Unified interface for blob storage backends.
///
/// All paths are relative to the storage root and are validated with
/// [`validate_path`](crate::validate_path) by implementations before use.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use videostream_model::models::MediaArea;
/// use videostream_storage::{BlobStorage, error::Result};
///
/// async fn upload_thumbnail(storage: &dyn BlobStorage, png: &[u8]) -> Result<String> {
///     let handle = storage.store(png, &MediaArea::FlashThumbnail.destination("clip.png")).await?;
///     Ok(handle.to_string())
/// }
/// ```
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Name of the configured backend (used for logging only).
    fn name(&self) -> &str;

    /// Check if a file exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents, creating parent directories as needed and
    /// overwriting whatever was there.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Write file contents only if nothing exists at `path` yet.
    ///
    /// Returns [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if
    /// the path is taken. The check and the write are a single step, so two
    /// concurrent callers never both succeed for the same path.
    async fn write_new(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Delete a file.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Store new bytes at `destination` and return a handle to them.
    ///
    /// Existing files are never overwritten: if `destination` is taken, the
    /// first free numbered alternative (`clip_1.webm`, `clip_2.webm`, ...) is
    /// used instead.
    async fn store(&self, data: &[u8], destination: &Path) -> Result<BlobHandle> {
        let destination = validate_path(destination)?;
        for candidate in candidates(&destination).take(MAX_NAME_ATTEMPTS) {
            match self.write_new(&candidate, data).await {
                Ok(()) => {
                    debug!(backend = self.name(), path = %candidate.display(), size = data.len(), "stored blob");
                    return Ok(BlobHandle::new(candidate));
                },
                Err(err) if matches!(&*err, ErrorKind::AlreadyExists(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        exn::bail!(ErrorKind::AlreadyExists(destination))
    }
}
