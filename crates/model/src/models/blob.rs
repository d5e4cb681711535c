use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// Reference to a file held by blob storage.
///
/// Only the path relative to the storage root is recorded; the bytes live in
/// whichever storage backend produced the handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobHandle(PathBuf);
impl BlobHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The area this handle was stored under, if it is one of the known
    /// media areas.
    pub fn area(&self) -> Option<MediaArea> {
        MediaArea::ALL.into_iter().find(|area| self.0.starts_with(area.prefix()))
    }
}
impl AsRef<Path> for BlobHandle {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
impl Display for BlobHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0.display())
    }
}

/// Destination areas for uploaded media, each a directory below the storage
/// root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaArea {
    /// Self-hosted HTML5 video files
    Html5,
    /// Flash source uploads waiting to be encoded
    FlashSource,
    /// Encoded `.flv` output
    FlashEncoded,
    /// Flash video thumbnails
    FlashThumbnail,
}
impl MediaArea {
    pub const ALL: [MediaArea; 4] =
        [MediaArea::Html5, MediaArea::FlashSource, MediaArea::FlashEncoded, MediaArea::FlashThumbnail];

    pub fn prefix(&self) -> &'static Path {
        Path::new(match self {
            MediaArea::Html5 => "videos/html5",
            MediaArea::FlashSource => "videos/flash/source",
            MediaArea::FlashEncoded => "videos/flash/flv",
            MediaArea::FlashThumbnail => "videos/flash/thumbnails",
        })
    }

    /// Destination for a file name within this area.
    pub fn destination(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.prefix().join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination() {
        assert_eq!(MediaArea::Html5.destination("clip.webm"), Path::new("videos/html5/clip.webm"));
        assert_eq!(
            MediaArea::FlashThumbnail.destination("clip.png"),
            Path::new("videos/flash/thumbnails/clip.png")
        );
    }

    #[test]
    fn test_handle_area() {
        let handle = BlobHandle::new("videos/flash/flv/clip.flv");
        assert_eq!(handle.area(), Some(MediaArea::FlashEncoded));
        // Component-based: "videos/html5x" is not inside "videos/html5".
        assert_eq!(BlobHandle::new("videos/html5x/clip.webm").area(), None);
    }
}
