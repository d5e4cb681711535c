//! Saving, querying and addressing video records.

use crate::Router;
use crate::error::{ErrorKind, Result, StoreResultExt};
use exn::ResultExt;
use std::collections::BTreeSet;
use std::sync::Arc;
use time::UtcDateTime;
use tracing::{info, instrument, warn};
use videostream_model::models::{
    Category, CategoryId, Draft, NewCategory, Slug, Variant, VariantKind, VideoId, VideoMeta, VideoRecord,
};
use videostream_storage::StorageHandle;
use videostream_store::{StoreHandle, VideoStore};

/// Source of the current time for save-time stamping.
pub type Clock = Arc<dyn Fn() -> UtcDateTime + Send + Sync>;

/// Entry point for everything an editor does with videos and categories.
///
/// Holds the store, blob storage and route templates the application was
/// configured with. All saves go through [`create`](Self::create) and
/// [`update`](Self::update), which stamp `modified_at` and run the publish
/// latch before anything reaches the store.
pub struct Library {
    pub(crate) store: StoreHandle,
    pub(crate) storage: StorageHandle,
    router: Router,
    clock: Clock,
}
impl Library {
    pub fn new(store: StoreHandle, storage: StorageHandle, router: Router) -> Self {
        Self { store, storage, router, clock: Arc::new(UtcDateTime::now) }
    }

    /// Replace the wall clock, e.g. with a fixed time in tests.
    pub fn with_clock(mut self, clock: impl Fn() -> UtcDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Current time, truncated to whole seconds like the store keeps it.
    fn now(&self) -> UtcDateTime {
        whole_seconds((self.clock)())
    }

    /// Saves a new record.
    ///
    /// The draft itself is never modified: on success the returned record
    /// carries the identifier, both timestamps and, if the draft was public
    /// without a publish date, the publish date.
    ///
    /// # Errors
    /// [`ErrorKind::Conflict`] if the slug is taken, in which case nothing
    /// was created.
    #[instrument(skip_all, fields(slug = %draft.slug))]
    pub async fn create(&self, draft: &VideoRecord<Draft>) -> Result<VideoRecord> {
        let now = self.now();
        let mut draft = draft.clone();
        draft.publish_at = draft.publish_at.map(whole_seconds);
        draft.latch_publish(now);
        let id = self.store.create(&draft, now).await.or_raise_store()?;
        info!(%id, kind = %draft.variant.kind(), "created video");
        Ok(draft.into_saved(id, now))
    }

    /// Saves the base fields of an existing record.
    ///
    /// Payload and categories are not written; use
    /// [`update_variant`](Self::update_variant) and
    /// [`set_categories`](Self::set_categories) for those. If the store
    /// rejects the save, `record` keeps its previous stamps.
    pub async fn update(&self, record: &mut VideoRecord) -> Result<()> {
        self.save(record, |_| ()).await
    }

    /// Makes the record public and saves it.
    ///
    /// The first time this happens the publish date is set to now.
    pub async fn publish(&self, record: &mut VideoRecord) -> Result<()> {
        self.save(record, |meta| meta.is_public = true).await
    }

    /// Hides the record again. The publish date is kept.
    pub async fn unpublish(&self, record: &mut VideoRecord) -> Result<()> {
        self.save(record, |meta| meta.is_public = false).await
    }

    #[instrument(skip_all, fields(id = %record.id(), slug = %record.slug))]
    async fn save(&self, record: &mut VideoRecord, edit: impl FnOnce(&mut VideoMeta)) -> Result<()> {
        let now = self.now();
        if now < record.modified_at() {
            warn!(modified_at = %record.modified_at(), %now, "clock is behind the last save, keeping modified_at");
        }
        let mut saved = record.clone();
        edit(&mut saved);
        saved.publish_at = saved.publish_at.map(whole_seconds);
        saved.touch(now);
        self.store.update(&saved).await.or_raise_store()?;
        *record = saved;
        Ok(())
    }

    /// Replaces the record's payload, possibly with one of another kind.
    #[instrument(skip_all, fields(id = %record.id(), kind = %variant.kind()))]
    pub async fn update_variant(&self, record: &mut VideoRecord, variant: Variant) -> Result<()> {
        self.store.update_variant(record.id(), &variant).await.or_raise_store()?;
        record.variant = variant;
        Ok(())
    }

    /// Replaces the categories the record is filed under.
    #[instrument(skip_all, fields(id = %record.id(), count = categories.len()))]
    pub async fn set_categories(&self, record: &mut VideoRecord, categories: BTreeSet<CategoryId>) -> Result<()> {
        self.store.set_categories(record.id(), &categories).await.or_raise_store()?;
        record.categories = categories;
        Ok(())
    }

    pub fn canonical_url(&self, record: &VideoRecord) -> Result<String> {
        self.router.canonical_url(record)
    }

    pub async fn get(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        self.store.get(id).await.or_raise_store()
    }

    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<VideoRecord>> {
        self.store.get_by_slug(slug).await.or_raise_store()
    }

    /// Like [`get_by_slug`](Self::get_by_slug), but a missing record is an
    /// error.
    pub async fn require(&self, slug: &Slug) -> Result<VideoRecord> {
        match self.get_by_slug(slug).await? {
            Some(record) => Ok(record),
            None => exn::bail!(ErrorKind::NotFound(format!("video {slug}"))),
        }
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<VideoRecord>> {
        self.store.list().await.or_raise_store()
    }

    /// Records visitors may see right now.
    pub async fn list_public(&self) -> Result<Vec<VideoRecord>> {
        self.store.list_public(self.now()).await.or_raise_store()
    }

    pub async fn list_in_category(&self, slug: &Slug) -> Result<Vec<VideoRecord>> {
        self.store.list_in_category(slug).await.or_raise_store()
    }

    pub async fn latest(&self) -> Result<Option<VideoRecord>> {
        self.store.latest().await.or_raise_store()
    }

    /// Deletes a record with its payload and category links. Media files are
    /// left in storage.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: VideoId) -> Result<bool> {
        self.store.delete(id).await.or_raise_store()
    }

    #[instrument(skip_all, fields(slug = %category.slug))]
    pub async fn create_category(&self, category: &NewCategory) -> Result<Category> {
        let category = self.store.create_category(category).await.or_raise_store()?;
        info!(id = %category.id, "created category");
        Ok(category)
    }

    pub async fn update_category(&self, category: &Category) -> Result<()> {
        self.store.update_category(category).await.or_raise_store()
    }

    pub async fn get_category_by_slug(&self, slug: &Slug) -> Result<Option<Category>> {
        self.store.get_category_by_slug(slug).await.or_raise_store()
    }

    /// All categories, ordered by title.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.store.list_categories().await.or_raise_store()
    }

    /// Deletes a category. Videos filed under it are kept.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        self.store.delete_category(id).await.or_raise_store()
    }

    pub fn category_url(&self, category: &Category) -> Result<String> {
        self.router.category_url(category)
    }
}

/// Drops sub-second precision, which the store does not keep.
fn whole_seconds(time: UtcDateTime) -> UtcDateTime {
    time.replace_nanosecond(0).unwrap_or(time)
}

/// MIME label of a self-hosted video, e.g. `video/webm`.
///
/// # Errors
/// [`ErrorKind::UnknownVariant`] for embedded and encoded-upload videos.
pub fn resolve_variant_type(meta: &VideoMeta) -> Result<&'static str> {
    meta.video_type()
        .or_raise(|| ErrorKind::UnknownVariant { expected: VariantKind::SelfHosted, found: meta.variant.kind() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;
    use time::{Date, Duration, Month, Time};
    use videostream_config::RouteConfig;
    use videostream_model::models::{EmbeddedVideo, MediaKind, SelfHostedVideo, Tags};
    use videostream_storage::backend::MockBackend;
    use videostream_store::{Database, MockStore, SqliteStore};

    fn march(day: u8, hour: u8) -> UtcDateTime {
        UtcDateTime::new(Date::from_calendar_date(2024, Month::March, day).unwrap(), Time::from_hms(hour, 0, 0).unwrap())
    }

    struct Fixture {
        library: Library,
        store: Arc<MockStore>,
        time: Arc<Mutex<UtcDateTime>>,
    }
    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MockStore::new());
            let time = Arc::new(Mutex::new(march(5, 9)));
            let clock = time.clone();
            let library =
                Library::new(store.clone(), Arc::new(MockBackend::default()), Router::new(&RouteConfig::default()).unwrap())
                    .with_clock(move || *clock.lock().unwrap());
            Self { library, store, time }
        }

        fn set_time(&self, now: UtcDateTime) {
            *self.time.lock().unwrap() = now;
        }

        fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap();
            *time += by;
        }
    }

    fn draft(slug: &str) -> VideoRecord<Draft> {
        VideoRecord::new(VideoMeta::new("Intro Clip", Slug::new(slug).unwrap(), EmbeddedVideo::default()))
    }

    #[tokio::test]
    async fn test_private_record_stays_unpublished() {
        let fx = Fixture::new();
        let mut record = fx.library.create(&draft("intro-clip")).await.unwrap();
        assert_eq!(record.publish_at, None);
        fx.advance(Duration::hours(1));
        fx.library.update(&mut record).await.unwrap();
        assert_eq!(record.publish_at, None);
        assert_eq!(fx.store.get(record.id()).await.unwrap().unwrap().publish_at, None);
    }

    #[tokio::test]
    async fn test_intro_clip_scenario() {
        let fx = Fixture::new();
        let mut draft = draft("intro-clip");
        draft.is_public = true;
        let record = fx.library.create(&draft).await.unwrap();
        assert_eq!(record.publish_at, Some(march(5, 9)));
        assert_eq!(draft.publish_at, None);
        assert_eq!(fx.library.canonical_url(&record).unwrap(), "/2024/mar/05/intro-clip/");
        let stored = fx.store.get(record.id()).await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let fx = Fixture::new();
        let mut draft = draft("intro-clip");
        draft.is_public = true;
        fx.library.create(&draft).await.unwrap();
        let err = fx.library.create(&draft).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Conflict(slug) if slug.as_str() == "intro-clip"));
        assert!(!err.is_retryable());
        assert_eq!(fx.store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_record_unchanged() {
        let fx = Fixture::new();
        fx.library.create(&draft("taken")).await.unwrap();
        let mut record = fx.library.create(&draft("mine")).await.unwrap();
        fx.advance(Duration::hours(1));
        record.slug = Slug::new("taken").unwrap();
        let before = record.clone();
        let err = fx.library.publish(&mut record).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Conflict(_)));
        assert_eq!(record, before);
        assert!(!record.is_public);
        assert_eq!(record.publish_at, None);
    }

    #[rstest]
    #[case::before_creation(march(1, 0))]
    #[case::in_the_future(march(30, 12))]
    #[tokio::test]
    async fn test_explicit_publish_date_is_kept(#[case] publish_at: UtcDateTime) {
        let fx = Fixture::new();
        let mut draft = draft("intro-clip");
        draft.publish_at = Some(publish_at);
        let mut record = fx.library.create(&draft).await.unwrap();
        for _ in 0..2 {
            fx.advance(Duration::days(1));
            fx.library.publish(&mut record).await.unwrap();
            assert_eq!(record.publish_at, Some(publish_at));
            fx.library.unpublish(&mut record).await.unwrap();
            assert_eq!(record.publish_at, Some(publish_at));
        }
    }

    #[tokio::test]
    async fn test_publish_latch_fires_once() {
        let fx = Fixture::new();
        let mut record = fx.library.create(&draft("intro-clip")).await.unwrap();
        fx.set_time(march(6, 10));
        fx.library.publish(&mut record).await.unwrap();
        assert_eq!(record.publish_at, Some(march(6, 10)));
        fx.set_time(march(7, 10));
        fx.library.update(&mut record).await.unwrap();
        fx.library.unpublish(&mut record).await.unwrap();
        fx.library.publish(&mut record).await.unwrap();
        assert_eq!(record.publish_at, Some(march(6, 10)));
        assert_eq!(fx.library.canonical_url(&record).unwrap(), "/2024/mar/06/intro-clip/");
    }

    #[tokio::test]
    async fn test_modified_at_never_decreases() {
        let fx = Fixture::new();
        let mut record = fx.library.create(&draft("intro-clip")).await.unwrap();
        assert_eq!(record.created_at(), record.modified_at());
        fx.set_time(march(6, 9));
        fx.library.update(&mut record).await.unwrap();
        assert_eq!(record.modified_at(), march(6, 9));
        fx.library.update(&mut record).await.unwrap();
        assert_eq!(record.modified_at(), march(6, 9));
        fx.set_time(march(1, 9));
        fx.library.update(&mut record).await.unwrap();
        assert_eq!(record.modified_at(), march(6, 9));
        assert_eq!(record.created_at(), march(5, 9));
    }

    #[tokio::test]
    async fn test_timestamps_are_whole_seconds() {
        let fx = Fixture::new();
        fx.set_time(march(5, 9) + Duration::milliseconds(1500));
        let record = fx.library.create(&draft("intro-clip")).await.unwrap();
        assert_eq!(record.created_at(), march(5, 9) + Duration::seconds(1));
        assert_eq!(record.created_at().nanosecond(), 0);
    }

    #[tokio::test]
    async fn test_explicit_publish_date_matches_stored_record() {
        let db = Database::connect_in_memory().await.unwrap();
        let router = Router::new(&RouteConfig::default()).unwrap();
        let library = Library::new(Arc::new(SqliteStore::from(&db)), Arc::new(MockBackend::default()), router)
            .with_clock(|| march(5, 9));
        let mut draft = draft("intro-clip");
        draft.publish_at = Some(march(5, 9) + Duration::milliseconds(500));
        let mut created = library.create(&draft).await.unwrap();
        assert_eq!(created.publish_at, Some(march(5, 9)));
        assert_eq!(library.get(created.id()).await.unwrap().unwrap(), created);

        created.publish_at = Some(march(6, 9) + Duration::milliseconds(250));
        library.update(&mut created).await.unwrap();
        assert_eq!(created.publish_at, Some(march(6, 9)));
        assert_eq!(library.get(created.id()).await.unwrap().unwrap(), created);
        db.close().await;
    }

    #[tokio::test]
    async fn test_unpublished_url_uses_id() {
        let fx = Fixture::new();
        let record = fx.library.create(&draft("intro-clip")).await.unwrap();
        let url = fx.library.canonical_url(&record).unwrap();
        assert_eq!(url, format!("/{}/", record.id()));
        assert_eq!(url, fx.library.canonical_url(&record).unwrap());
    }

    #[tokio::test]
    async fn test_update_writes_base_fields_only() {
        let fx = Fixture::new();
        let mut record = fx.library.create(&draft("intro-clip")).await.unwrap();
        record.title = "Renamed".to_string();
        record.tags = "rust, video".parse::<Tags>().unwrap();
        record.variant = Variant::SelfHosted(SelfHostedVideo::default());
        fx.library.update(&mut record).await.unwrap();
        let stored = fx.store.get(record.id()).await.unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
        assert!(stored.tags.contains("rust"));
        assert_eq!(stored.variant.kind(), VariantKind::Embedded);
    }

    #[tokio::test]
    async fn test_update_variant_and_categories() {
        let fx = Fixture::new();
        let talks = fx.library.create_category(&NewCategory::new("Talks", Slug::new("talks").unwrap())).await.unwrap();
        let mut record = fx.library.create(&draft("intro-clip")).await.unwrap();
        let variant = Variant::SelfHosted(SelfHostedVideo { media_kind: MediaKind::Mp4, file_reference: None });
        fx.library.update_variant(&mut record, variant.clone()).await.unwrap();
        fx.library.set_categories(&mut record, BTreeSet::from([talks.id])).await.unwrap();
        let stored = fx.store.get(record.id()).await.unwrap().unwrap();
        assert_eq!(stored.variant, variant);
        assert_eq!(stored, record);
        assert_eq!(resolve_variant_type(&stored).unwrap(), "video/mp4");
        let filed = fx.library.list_in_category(&talks.slug).await.unwrap();
        assert_eq!(filed.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_category_is_not_found() {
        let fx = Fixture::new();
        let mut record = fx.library.create(&draft("intro-clip")).await.unwrap();
        let err = fx.library.set_categories(&mut record, BTreeSet::from([CategoryId(99)])).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert!(record.categories.is_empty());
    }

    #[rstest]
    #[case::webm(MediaKind::Webm, "video/webm")]
    #[case::ogg(MediaKind::Ogg, "video/ogg")]
    #[case::mp4(MediaKind::Mp4, "video/mp4")]
    #[case::flash(MediaKind::Flash, "video/flv")]
    fn test_resolve_variant_type(#[case] media_kind: MediaKind, #[case] expected: &str) {
        let video = SelfHostedVideo { media_kind, file_reference: None };
        let meta = VideoMeta::new("Clip", Slug::new("clip").unwrap(), video);
        assert_eq!(resolve_variant_type(&meta).unwrap(), expected);
    }

    #[test]
    fn test_resolve_variant_type_embedded() {
        let meta = VideoMeta::new("Clip", Slug::new("clip").unwrap(), EmbeddedVideo::default());
        let err = resolve_variant_type(&meta).unwrap_err();
        assert!(matches!(
            &*err,
            ErrorKind::UnknownVariant { expected: VariantKind::SelfHosted, found: VariantKind::Embedded }
        ));
    }

    #[tokio::test]
    async fn test_queries() {
        let fx = Fixture::new();
        let mut first = draft("first");
        first.is_public = true;
        let first = fx.library.create(&first).await.unwrap();
        fx.advance(Duration::hours(1));
        let mut scheduled = draft("scheduled");
        scheduled.is_public = true;
        scheduled.publish_at = Some(march(20, 0));
        let scheduled = fx.library.create(&scheduled).await.unwrap();
        let hidden = fx.library.create(&draft("hidden")).await.unwrap();

        let public: Vec<_> = fx.library.list_public().await.unwrap().into_iter().map(|v| v.id()).collect();
        assert_eq!(public, vec![first.id()]);
        let all: Vec<_> = fx.library.list().await.unwrap().into_iter().map(|v| v.id()).collect();
        assert_eq!(all, vec![scheduled.id(), first.id(), hidden.id()]);
        assert_eq!(fx.library.latest().await.unwrap().map(|v| v.id()), Some(scheduled.id()));

        fx.set_time(march(21, 0));
        assert_eq!(fx.library.list_public().await.unwrap().len(), 2);

        let slug = Slug::new("hidden").unwrap();
        assert_eq!(fx.library.require(&slug).await.unwrap().id(), hidden.id());
        assert!(fx.library.delete(hidden.id()).await.unwrap());
        assert!(!fx.library.delete(hidden.id()).await.unwrap());
        assert!(fx.library.get(hidden.id()).await.unwrap().is_none());
        let err = fx.library.require(&slug).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_categories() {
        let fx = Fixture::new();
        let slug = Slug::new("talks").unwrap();
        let mut talks = fx.library.create_category(&NewCategory::new("Talks", slug.clone())).await.unwrap();
        let err = fx.library.create_category(&NewCategory::new("Other", slug.clone())).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Conflict(_)));
        fx.library.create_category(&NewCategory::new("Animation", Slug::new("animation").unwrap())).await.unwrap();

        talks.description = Some("Recorded talks".to_string());
        fx.library.update_category(&talks).await.unwrap();
        assert_eq!(fx.library.get_category_by_slug(&slug).await.unwrap(), Some(talks.clone()));
        assert_eq!(fx.library.category_url(&talks).unwrap(), "/category/talks/");

        let titles: Vec<_> = fx.library.list_categories().await.unwrap().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Animation", "Talks"]);

        let mut record = fx.library.create(&draft("intro-clip")).await.unwrap();
        fx.library.set_categories(&mut record, BTreeSet::from([talks.id])).await.unwrap();
        assert!(fx.library.delete_category(talks.id).await.unwrap());
        let stored = fx.library.get(record.id()).await.unwrap().unwrap();
        assert!(stored.categories.is_empty());
    }
}
