use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Deref,
    str::FromStr,
};

use crate::error::{Error, ErrorKind};
use rslug::slugify;

/// A URL-safe, unique short identifier.
///
/// Slugs are non-empty, at most [`MAX_LEN`](Self::MAX_LEN) bytes, and only
/// contain lowercase ASCII letters, digits, hyphens and underscores.
/// Uniqueness is *not* checked here, that is the store's job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slug(String);
impl Slug {
    pub const MAX_LEN: usize = 50;

    /// Validates an editor-supplied slug as-is.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= Self::MAX_LEN
            && value.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
        match valid {
            true => Ok(Self(value)),
            false => exn::bail!(ErrorKind::InvalidSlug(value)),
        }
    }

    /// Derives a slug from free text, such as a title.
    ///
    /// Fails if nothing URL-safe is left over (e.g. a title made only of
    /// punctuation).
    pub fn from_title(title: impl AsRef<str>) -> Result<Self, Error> {
        let slug = slugify!(title.as_ref());
        let truncated = slug[..slug.floor_char_boundary(Self::MAX_LEN)].trim_end_matches('-');
        match truncated.is_empty() {
            true => exn::bail!(ErrorKind::InvalidSlug(title.as_ref().to_string())),
            false => Self::new(truncated),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl FromStr for Slug {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
impl TryFrom<String> for Slug {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
impl Deref for Slug {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for Slug {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
