//! Model Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::models::VariantKind;
use derive_more::{Display, Error};

/// A model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A variant-specific operation was invoked on a record holding a
    /// different payload. This is a programming or data-integrity error.
    #[display("unknown variant: expected {expected} payload, found {found}")]
    UnknownVariant {
        /// The payload the operation is defined for.
        expected: VariantKind,
        /// The payload the record actually holds.
        found: VariantKind,
    },
    /// The value cannot be used as a URL slug.
    #[display("invalid slug: {_0:?}")]
    InvalidSlug(#[error(not(source))] String),
    /// The tag input could not be turned into a tag set.
    #[display("invalid tags: {_0}")]
    InvalidTags(#[error(not(source))] String),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// Details about the parsing failure.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Model values are either valid or they're not.
        false
    }
}
