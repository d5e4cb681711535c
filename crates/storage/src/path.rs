//! Path validation and upload naming.
//!
//! Every path handed to a backend is relative to the storage root and must
//! never escape it. Upload file names come straight from editors' machines, so
//! they are reduced to something boring before use.

use rslug::slugify;
use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path and returns it normalized.
///
/// Ensures that paths don't escape the storage root (no `..` traversal) and
/// don't contain null bytes.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use videostream_storage::validate_path;
/// assert!(validate_path("videos/html5/clip.webm").is_ok());
/// assert!(validate_path("videos/../clip.webm").is_ok()); // (never leaves the root)
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("videos/../../clip.webm").is_err());
/// assert_eq!(
///     validate_path("/videos//html5/./clip.webm").unwrap(),
///     Path::new("videos/html5/clip.webm")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let invalid = || ErrorKind::InvalidPath(path.as_ref().to_path_buf());
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(invalid()),
        false => Ok(components.into_iter().collect()),
    }
}

/// Reduces an uploaded file name to a slugified stem and a lowercase
/// extension, e.g. `"My Holiday (1).WebM"` becomes `"my-holiday-1.webm"`.
///
/// Directory components are dropped. A name with nothing usable left falls
/// back to `"upload"`.
pub fn sanitize_file_name(name: impl AsRef<str>) -> String {
    let name = name.as_ref();
    // Browsers on Windows may send the full client path.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };
    let stem = match slugify!(stem) {
        s if s.is_empty() => "upload".to_string(),
        s => s,
    };
    let ext: Option<String> =
        ext.map(|e| e.chars().filter(char::is_ascii_alphanumeric).collect::<String>().to_ascii_lowercase());
    match ext {
        Some(ext) if !ext.is_empty() => format!("{stem}.{ext}"),
        _ => stem,
    }
}

/// Yields `destination` followed by numbered alternatives
/// (`clip_1.webm`, `clip_2.webm`, ...) for picking a free name.
pub(crate) fn candidates(destination: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    let parent = destination.parent().map(Path::to_path_buf).unwrap_or_default();
    let stem = destination.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = destination.extension().map(|e| e.to_string_lossy().into_owned());
    std::iter::once(destination.to_path_buf()).chain((1..).map(move |n| {
        let name = match &ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        parent.join(name)
    }))
}
