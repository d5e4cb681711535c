//! Blob Storage Error Types
//!
//! Every kind that concerns a particular blob carries its path relative to
//! the storage root, never the absolute location on disk.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A blob storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Blob storage failures.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("no blob at {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The storage root (or a directory below it) is not accessible.
    #[display("permission denied for {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Every numbered alternative of the destination is taken.
    #[display("no free name next to {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    #[display("media I/O failed: {_0}")]
    Io(IoError),
    /// Absolute, or escaping the storage root.
    #[display("invalid media path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Only plain I/O failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
