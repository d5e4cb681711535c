use super::{CategoryId, Permalink, Slug, Tags, Variant};
use crate::error::Result;
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::ops::{Deref, DerefMut};
use time::UtcDateTime;
use tracing::debug;

/// Store-assigned video identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VideoId(pub i64);
impl Display for VideoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything an editor gets to decide about a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMeta {
    pub title: String,
    /// Globally unique across all videos (enforced by the store).
    pub slug: Slug,
    pub tags: Tags,
    pub categories: BTreeSet<CategoryId>,
    pub description: Option<String>,
    pub is_public: bool,
    pub allow_comments: bool,
    /// Set automatically the first time the video is saved as public, unless
    /// the editor supplied a value first.
    pub publish_at: Option<UtcDateTime>,
    pub variant: Variant,
}
impl VideoMeta {
    pub fn new(title: impl Into<String>, slug: Slug, variant: impl Into<Variant>) -> Self {
        Self {
            title: title.into(),
            slug,
            tags: Tags::default(),
            categories: BTreeSet::new(),
            description: None,
            is_public: false,
            allow_comments: false,
            publish_at: None,
            variant: variant.into(),
        }
    }

    /// The publish latch.
    ///
    /// Assigns `publish_at = now` when the video is public and has no publish
    /// date yet. Once `publish_at` holds any value it is never overwritten
    /// here, no matter how often `is_public` is toggled afterwards.
    ///
    /// Returns `true` if the latch fired.
    pub fn latch_publish(&mut self, now: UtcDateTime) -> bool {
        if self.publish_at.is_none() && self.is_public {
            debug!(slug = %self.slug, "first public save, assigning publish date");
            self.publish_at = Some(now);
            return true;
        }
        false
    }

    /// Returns the MIME label of a self-hosted video.
    /// See [`Variant::video_type`].
    pub fn video_type(&self) -> Result<&'static str> {
        self.variant.video_type()
    }
}

// Persistence is part of the record's type, so "has an identifier" never
// needs checking at runtime.
mod sealed {
    pub trait Sealed {}
}
pub trait Persistence: sealed::Sealed {
    type Stamps: fmt::Debug + Clone + PartialEq + Eq;
}

/// Never stored. Has no identifier or timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draft;
impl sealed::Sealed for Draft {}
impl Persistence for Draft {
    type Stamps = ();
}

/// Stored at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saved;
impl sealed::Sealed for Saved {}
impl Persistence for Saved {
    type Stamps = Stamps;
}

/// Identity and bookkeeping timestamps of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamps {
    pub id: VideoId,
    /// Assigned once, on first persistence.
    pub created_at: UtcDateTime,
    /// Time of the most recent successful save.
    pub modified_at: UtcDateTime,
}

/// A video record, either a [`Draft`] or [`Saved`].
///
/// Dereferences to [`VideoMeta`] for all editor-controlled fields. The
/// identifier and timestamps are only reachable on saved records, and only
/// the lifecycle operations can change them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord<S: Persistence = Saved> {
    meta: VideoMeta,
    stamps: S::Stamps,
}
impl<S: Persistence> VideoRecord<S> {
    pub fn meta(&self) -> &VideoMeta {
        &self.meta
    }

    pub fn into_meta(self) -> VideoMeta {
        self.meta
    }
}
impl<S: Persistence> Deref for VideoRecord<S> {
    type Target = VideoMeta;
    fn deref(&self) -> &VideoMeta {
        &self.meta
    }
}
impl<S: Persistence> DerefMut for VideoRecord<S> {
    fn deref_mut(&mut self) -> &mut VideoMeta {
        &mut self.meta
    }
}
impl<S: Persistence> Display for VideoRecord<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.meta.title)
    }
}

impl VideoRecord<Draft> {
    pub fn new(meta: VideoMeta) -> Self {
        Self { meta, stamps: () }
    }

    /// Turns the draft into a saved record once the store has accepted it.
    ///
    /// Callers are expected to have run [`VideoMeta::latch_publish`] with the
    /// same `now` before handing the draft to the store.
    pub fn into_saved(self, id: VideoId, now: UtcDateTime) -> VideoRecord<Saved> {
        VideoRecord {
            meta: self.meta,
            stamps: Stamps { id, created_at: now, modified_at: now },
        }
    }
}
impl From<VideoMeta> for VideoRecord<Draft> {
    fn from(meta: VideoMeta) -> Self {
        Self::new(meta)
    }
}

impl VideoRecord<Saved> {
    /// Rebuilds a saved record from stored parts.
    pub fn restore(meta: VideoMeta, stamps: Stamps) -> Self {
        Self { meta, stamps }
    }

    pub fn id(&self) -> VideoId {
        self.stamps.id
    }

    pub fn created_at(&self) -> UtcDateTime {
        self.stamps.created_at
    }

    pub fn modified_at(&self) -> UtcDateTime {
        self.stamps.modified_at
    }

    pub fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    /// Save-time bookkeeping: bumps `modified_at` and runs the publish latch.
    ///
    /// `modified_at` never moves backwards; if `now` is earlier than the
    /// previous save, the previous value is kept. Returns `true` if the
    /// publish latch fired.
    pub fn touch(&mut self, now: UtcDateTime) -> bool {
        self.stamps.modified_at = self.stamps.modified_at.max(now);
        self.meta.latch_publish(now)
    }

    /// Canonical location of this video.
    ///
    /// Published videos are addressed by their publish date and slug, anything
    /// else by identifier.
    pub fn permalink(&self) -> Permalink {
        match self.meta.publish_at {
            Some(published) => Permalink::dated(published, self.meta.slug.clone()),
            None => Permalink::ById(self.stamps.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmbeddedVideo, MediaKind, SelfHostedVideo};
    use time::{Date, Month, Time};

    fn at(day: u8, hour: u8) -> UtcDateTime {
        UtcDateTime::new(
            Date::from_calendar_date(2024, Month::March, day).unwrap(),
            Time::from_hms(hour, 0, 0).unwrap(),
        )
    }

    fn meta(slug: &str) -> VideoMeta {
        VideoMeta::new("Intro Clip", Slug::new(slug).unwrap(), EmbeddedVideo::default())
    }

    fn saved(meta: VideoMeta) -> VideoRecord<Saved> {
        VideoRecord::new(meta).into_saved(VideoId(7), at(1, 9))
    }

    #[test]
    fn test_latch_does_not_fire_when_private() {
        let mut meta = meta("intro-clip");
        assert!(!meta.latch_publish(at(2, 9)));
        assert_eq!(meta.publish_at, None);
    }

    #[test]
    fn test_latch_fires_when_public() {
        let mut meta = meta("intro-clip");
        meta.is_public = true;
        assert!(meta.latch_publish(at(2, 9)));
        assert_eq!(meta.publish_at, Some(at(2, 9)));
    }

    #[test]
    fn test_latch_keeps_explicit_publish_date() {
        let mut meta = meta("intro-clip");
        meta.publish_at = Some(at(20, 12));
        assert!(!meta.latch_publish(at(2, 9)));
        meta.is_public = true;
        assert!(!meta.latch_publish(at(3, 9)));
        assert_eq!(meta.publish_at, Some(at(20, 12)));
    }

    #[test]
    fn test_latch_survives_toggling() {
        let mut record = saved(meta("intro-clip"));
        record.is_public = true;
        assert!(record.touch(at(2, 9)));
        record.is_public = false;
        assert!(!record.touch(at(3, 9)));
        record.is_public = true;
        assert!(!record.touch(at(4, 9)));
        assert_eq!(record.publish_at, Some(at(2, 9)));
    }

    #[test]
    fn test_touch_is_idempotent_for_publish_date() {
        let mut record = saved(meta("intro-clip"));
        record.is_public = true;
        record.touch(at(2, 9));
        let first = record.publish_at;
        record.touch(at(2, 10));
        assert_eq!(record.publish_at, first);
        assert_eq!(record.modified_at(), at(2, 10));
    }

    #[test]
    fn test_touch_never_moves_modified_backwards() {
        let mut record = saved(meta("intro-clip"));
        record.touch(at(5, 9));
        record.touch(at(4, 9));
        assert_eq!(record.modified_at(), at(5, 9));
        assert_eq!(record.created_at(), at(1, 9));
    }

    #[test]
    fn test_permalink_falls_back_to_id() {
        let record = saved(meta("intro-clip"));
        assert_eq!(record.permalink(), Permalink::ById(VideoId(7)));
    }

    #[test]
    fn test_permalink_uses_publish_date() {
        let mut record = saved(meta("intro-clip"));
        record.is_public = true;
        record.touch(at(2, 9));
        assert_eq!(record.permalink().to_string(), "/2024/mar/02/intro-clip/");
        // Deterministic
        assert_eq!(record.permalink(), record.permalink());
    }

    #[test]
    fn test_video_type_through_record() {
        let record = VideoRecord::new(VideoMeta::new(
            "Clip",
            Slug::new("clip").unwrap(),
            SelfHostedVideo { media_kind: MediaKind::Ogg, file_reference: None },
        ));
        assert_eq!(record.video_type().unwrap(), "video/ogg");
        assert!(saved(meta("intro-clip")).video_type().is_err());
    }

    #[test]
    fn test_display_is_title() {
        assert_eq!(saved(meta("intro-clip")).to_string(), "Intro Clip");
    }
}
