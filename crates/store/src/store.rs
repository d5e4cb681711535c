//! The persistent store interface.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use time::UtcDateTime;
use videostream_model::models::{Category, CategoryId, NewCategory, Slug, Variant, VideoId, VideoMeta, VideoRecord};

/// Shared handle to whichever store the application was configured with.
pub type StoreHandle = Arc<dyn VideoStore + Send + Sync>;

/// Persistence for video records and categories.
///
/// Stores are dumb: they write exactly what they are given. Stamping
/// timestamps and the publish latch belong to the lifecycle layer above.
///
/// Listings are ordered newest first: by publish date descending (records
/// without one last), then creation date descending.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert a new record with its payload and category links, all or
    /// nothing. `now` becomes both `created_at` and `modified_at`.
    ///
    /// Returns [`Conflict`](crate::error::ErrorKind::Conflict) if the slug is
    /// taken, and [`NotFound`](crate::error::ErrorKind::NotFound) if a
    /// referenced category does not exist.
    async fn create(&self, meta: &VideoMeta, now: UtcDateTime) -> Result<VideoId>;

    /// Write the base fields and `modified_at` of an existing record.
    ///
    /// The payload and category links are left untouched; see
    /// [`update_variant`](Self::update_variant) and
    /// [`set_categories`](Self::set_categories).
    async fn update(&self, record: &VideoRecord) -> Result<()>;

    /// Replace the payload of a record, possibly with one of another kind.
    async fn update_variant(&self, id: VideoId, variant: &Variant) -> Result<()>;

    /// Replace the category links of a record.
    async fn set_categories(&self, id: VideoId, categories: &BTreeSet<CategoryId>) -> Result<()>;

    async fn get(&self, id: VideoId) -> Result<Option<VideoRecord>>;

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<VideoRecord>>;

    async fn list(&self) -> Result<Vec<VideoRecord>>;

    /// Public records whose publish date is at or before `now`.
    async fn list_public(&self, now: UtcDateTime) -> Result<Vec<VideoRecord>>;

    async fn list_in_category(&self, slug: &Slug) -> Result<Vec<VideoRecord>>;

    /// The record with the most recent publish date, if any has one.
    async fn latest(&self) -> Result<Option<VideoRecord>>;

    /// Delete a record together with its payload and category links.
    ///
    /// Returns `false` if there was nothing to delete.
    async fn delete(&self, id: VideoId) -> Result<bool>;

    async fn create_category(&self, category: &NewCategory) -> Result<Category>;

    async fn update_category(&self, category: &Category) -> Result<()>;

    async fn get_category_by_slug(&self, slug: &Slug) -> Result<Option<Category>>;

    /// All categories, ordered by title.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Delete a category and unlink it from every video. Videos themselves
    /// are never deleted.
    async fn delete_category(&self, id: CategoryId) -> Result<bool>;
}
