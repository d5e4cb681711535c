//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Store and storage failures are raised as children of
//! the kinds below so the full tree is kept.

use derive_more::{Display, Error};
use exn::ResultExt;
use videostream_model::models::{Slug, VariantKind};
use videostream_store::error::{Error as StoreError, ErrorKind as StoreErrorKind};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Editor errors
/// - [`ErrorKind::Conflict`]
/// - [`ErrorKind::UnknownVariant`]
/// - [`ErrorKind::NotFound`]
///
/// ### Dependency errors
/// - [`ErrorKind::Store`]
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::Route`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The slug is taken by another record. Nothing was saved.
    #[display("slug already in use: {_0}")]
    Conflict(#[error(not(source))] Slug),
    /// The operation needs a different payload than the record holds.
    #[display("expected a {expected} video, found {found}")]
    UnknownVariant { expected: VariantKind, found: VariantKind },
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Any other failure of the persistent store.
    #[display("store operation failed")]
    Store,
    /// Blob storage could not store or remove media.
    #[display("storage operation failed")]
    Storage,
    /// A route template did not compile or render.
    #[display("route template error")]
    Route,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store | Self::Storage => true,
            Self::Conflict(_) | Self::UnknownVariant { .. } | Self::NotFound(_) | Self::Route => false,
        }
    }
}

/// Raises store errors while keeping the kinds editors can act on.
pub(crate) trait StoreResultExt<T> {
    fn or_raise_store(self) -> Result<T>;
}
impl<T> StoreResultExt<T> for std::result::Result<T, StoreError> {
    fn or_raise_store(self) -> Result<T> {
        self.or_else(|err| {
            let kind = match &*err {
                StoreErrorKind::Conflict(slug) => ErrorKind::Conflict(slug.clone()),
                StoreErrorKind::NotFound(what) => ErrorKind::NotFound(what.clone()),
                _ => ErrorKind::Store,
            };
            Err(err).or_raise(|| kind)
        })
    }
}
