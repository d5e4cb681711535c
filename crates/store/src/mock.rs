//! In-memory store for testing.

use crate::error::{ErrorKind, Result};
use crate::store::VideoStore;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use time::UtcDateTime;
use tokio::sync::RwLock;
use videostream_model::models::{
    Category, CategoryId, NewCategory, Slug, Stamps, Variant, VideoId, VideoMeta, VideoRecord,
};

#[derive(Default)]
struct State {
    videos: BTreeMap<VideoId, VideoRecord>,
    categories: BTreeMap<CategoryId, Category>,
    last_video: i64,
    last_category: i64,
}
impl State {
    fn check_categories(&self, categories: &BTreeSet<CategoryId>) -> Result<()> {
        match categories.iter().find(|id| !self.categories.contains_key(id)) {
            Some(id) => exn::bail!(ErrorKind::NotFound(format!("category {id}"))),
            None => Ok(()),
        }
    }

    fn slug_taken(&self, slug: &Slug, except: Option<VideoId>) -> bool {
        self.videos.values().any(|v| &v.slug == slug && Some(v.id()) != except)
    }
}

fn newest_first(mut videos: Vec<VideoRecord>) -> Vec<VideoRecord> {
    videos.sort_by_key(|v| (v.publish_at.is_none(), Reverse(v.publish_at), Reverse(v.created_at()), Reverse(v.id())));
    videos
}

/// In-memory [`VideoStore`] with the same constraints as the SQLite store:
/// unique slugs, existing categories, and cascading deletes.
#[derive(Default)]
pub struct MockStore {
    state: RwLock<State>,
}
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoStore for MockStore {
    async fn create(&self, meta: &VideoMeta, now: UtcDateTime) -> Result<VideoId> {
        let mut state = self.state.write().await;
        if state.slug_taken(&meta.slug, None) {
            exn::bail!(ErrorKind::Conflict(meta.slug.clone()));
        }
        state.check_categories(&meta.categories)?;
        state.last_video += 1;
        let id = VideoId(state.last_video);
        let stamps = Stamps { id, created_at: now, modified_at: now };
        state.videos.insert(id, VideoRecord::restore(meta.clone(), stamps));
        Ok(id)
    }

    async fn update(&self, record: &VideoRecord) -> Result<()> {
        let mut state = self.state.write().await;
        if state.slug_taken(&record.slug, Some(record.id())) {
            exn::bail!(ErrorKind::Conflict(record.slug.clone()));
        }
        let Some(stored) = state.videos.get_mut(&record.id()) else {
            exn::bail!(ErrorKind::NotFound(format!("video {}", record.id())));
        };
        let mut meta = record.meta().clone();
        meta.variant = stored.variant.clone();
        meta.categories = stored.categories.clone();
        let stamps = Stamps { modified_at: record.modified_at(), ..*stored.stamps() };
        *stored = VideoRecord::restore(meta, stamps);
        Ok(())
    }

    async fn update_variant(&self, id: VideoId, variant: &Variant) -> Result<()> {
        let mut state = self.state.write().await;
        let Some(stored) = state.videos.get_mut(&id) else {
            exn::bail!(ErrorKind::NotFound(format!("video {id}")));
        };
        stored.variant = variant.clone();
        Ok(())
    }

    async fn set_categories(&self, id: VideoId, categories: &BTreeSet<CategoryId>) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.videos.contains_key(&id) {
            exn::bail!(ErrorKind::NotFound(format!("video {id}")));
        }
        state.check_categories(categories)?;
        if let Some(stored) = state.videos.get_mut(&id) {
            stored.categories = categories.clone();
        }
        Ok(())
    }

    async fn get(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        Ok(self.state.read().await.videos.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<VideoRecord>> {
        Ok(self.state.read().await.videos.values().find(|v| &v.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        Ok(newest_first(self.state.read().await.videos.values().cloned().collect()))
    }

    async fn list_public(&self, now: UtcDateTime) -> Result<Vec<VideoRecord>> {
        let state = self.state.read().await;
        let public = state.videos.values().filter(|v| v.is_public && v.publish_at.is_some_and(|p| p <= now));
        Ok(newest_first(public.cloned().collect()))
    }

    async fn list_in_category(&self, slug: &Slug) -> Result<Vec<VideoRecord>> {
        let state = self.state.read().await;
        let Some(category) = state.categories.values().find(|c| &c.slug == slug) else {
            return Ok(Vec::new());
        };
        let linked = state.videos.values().filter(|v| v.categories.contains(&category.id));
        Ok(newest_first(linked.cloned().collect()))
    }

    async fn latest(&self) -> Result<Option<VideoRecord>> {
        Ok(self.list().await?.into_iter().find(|v| v.publish_at.is_some()))
    }

    async fn delete(&self, id: VideoId) -> Result<bool> {
        Ok(self.state.write().await.videos.remove(&id).is_some())
    }

    async fn create_category(&self, category: &NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;
        if state.categories.values().any(|c| c.slug == category.slug) {
            exn::bail!(ErrorKind::Conflict(category.slug.clone()));
        }
        state.last_category += 1;
        let created = category.clone().into_category(CategoryId(state.last_category));
        state.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        let mut state = self.state.write().await;
        if state.categories.values().any(|c| c.slug == category.slug && c.id != category.id) {
            exn::bail!(ErrorKind::Conflict(category.slug.clone()));
        }
        let Some(stored) = state.categories.get_mut(&category.id) else {
            exn::bail!(ErrorKind::NotFound(format!("category {}", category.id)));
        };
        *stored = category.clone();
        Ok(())
    }

    async fn get_category_by_slug(&self, slug: &Slug) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.values().find(|c| &c.slug == slug).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<_> = self.state.read().await.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for video in state.videos.values_mut() {
            video.categories.remove(&id);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use videostream_model::models::EmbeddedVideo;

    fn meta(slug: &str) -> VideoMeta {
        VideoMeta::new(slug, Slug::new(slug).unwrap(), EmbeddedVideo::default())
    }

    #[tokio::test]
    async fn test_conflicts_like_sqlite() {
        let store = MockStore::new();
        store.create(&meta("intro-clip"), UtcDateTime::UNIX_EPOCH).await.unwrap();
        let err = store.create(&meta("intro-clip"), UtcDateTime::UNIX_EPOCH).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Conflict(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_category_unlinks() {
        let store = MockStore::new();
        let category = store.create_category(&NewCategory::new("Talks", Slug::new("talks").unwrap())).await.unwrap();
        let mut video = meta("keynote");
        video.categories.insert(category.id);
        let id = store.create(&video, UtcDateTime::UNIX_EPOCH).await.unwrap();
        assert!(store.delete_category(category.id).await.unwrap());
        assert!(store.get(id).await.unwrap().unwrap().categories.is_empty());
    }
}
