//! SQLite implementation of [`VideoStore`].
//!
//! A record spans three tables: the base row in `videos`, exactly one row in
//! `video_payloads` and any number of links in `video_categories`. Reads go
//! through the `video_details` view, which joins all three.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{BaseRow, CategoryRow, PayloadRow, VideoRow};
use crate::store::VideoStore;
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeSet;
use time::UtcDateTime;
use tracing::{debug, instrument};
use videostream_model::models::{Category, CategoryId, NewCategory, Slug, Variant, VideoId, VideoMeta, VideoRecord};

/// Raises a failed write, turning constraint violations into actionable kinds.
fn raise_write<T>(err: sqlx::Error, slug: Option<&Slug>, missing: impl FnOnce() -> String) -> Result<T> {
    let kind = match (&err, slug) {
        (sqlx::Error::Database(e), Some(slug)) if e.is_unique_violation() => ErrorKind::Conflict(slug.clone()),
        (sqlx::Error::Database(e), _) if e.is_foreign_key_violation() => ErrorKind::NotFound(missing()),
        _ => ErrorKind::Database,
    };
    Err(err).or_raise(|| kind)
}

fn into_records(rows: Vec<VideoRow>) -> Result<Vec<VideoRecord>> {
    rows.into_iter().map(VideoRecord::try_from).collect()
}

/// Video store backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}
impl From<&Database> for SqliteStore {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn upsert_payload(conn: &mut SqliteConnection, id: VideoId, row: PayloadRow) -> Result<()> {
        sqlx::query(include_str!("../queries/upsert_payload.sql"))
            .bind(id.0)
            .bind(row.kind)
            .bind(row.media_kind)
            .bind(row.file_reference)
            .bind(row.source_url)
            .bind(row.embed_markup)
            .bind(row.source_upload)
            .bind(row.encoded_output)
            .bind(row.thumbnail)
            .bind(row.needs_encode)
            .execute(conn)
            .await
            .or_else(|e| raise_write(e, None, || format!("video {id}")))?;
        Ok(())
    }

    async fn link_categories(conn: &mut SqliteConnection, id: VideoId, categories: &BTreeSet<CategoryId>) -> Result<()> {
        for category in categories {
            sqlx::query(include_str!("../queries/insert_video_category.sql"))
                .bind(id.0)
                .bind(category.0)
                .execute(&mut *conn)
                .await
                .or_else(|e| raise_write(e, None, || format!("category {category}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl VideoStore for SqliteStore {
    // =========================================================================
    // Videos: writes
    // =========================================================================

    #[instrument(skip_all, fields(slug = %meta.slug))]
    async fn create(&self, meta: &VideoMeta, now: UtcDateTime) -> Result<VideoId> {
        let base = BaseRow::try_from(meta)?;
        let payload = PayloadRow::try_from(&meta.variant)?;
        let now = now.unix_timestamp();
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let result = sqlx::query(include_str!("../queries/insert_video.sql"))
            .bind(base.title)
            .bind(base.slug)
            .bind(base.tags)
            .bind(base.description)
            .bind(base.is_public)
            .bind(base.allow_comments)
            .bind(base.publish_at)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .or_else(|e| raise_write(e, Some(&meta.slug), String::new))?;
        let id = VideoId(result.last_insert_rowid());
        Self::upsert_payload(&mut tx, id, payload).await?;
        Self::link_categories(&mut tx, id, &meta.categories).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        debug!(%id, "created video");
        Ok(id)
    }

    #[instrument(skip_all, fields(id = %record.id(), slug = %record.slug))]
    async fn update(&self, record: &VideoRecord) -> Result<()> {
        let base = BaseRow::try_from(record.meta())?;
        let result = sqlx::query(include_str!("../queries/update_video.sql"))
            .bind(base.title)
            .bind(base.slug)
            .bind(base.tags)
            .bind(base.description)
            .bind(base.is_public)
            .bind(base.allow_comments)
            .bind(base.publish_at)
            .bind(record.modified_at().unix_timestamp())
            .bind(record.id().0)
            .execute(&self.pool)
            .await
            .or_else(|e| raise_write(e, Some(&record.slug), String::new))?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::NotFound(format!("video {}", record.id())));
        }
        Ok(())
    }

    #[instrument(skip(self, variant), fields(kind = %variant.kind()))]
    async fn update_variant(&self, id: VideoId, variant: &Variant) -> Result<()> {
        let payload = PayloadRow::try_from(variant)?;
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        Self::upsert_payload(&mut conn, id, payload).await
    }

    #[instrument(skip(self))]
    async fn set_categories(&self, id: VideoId, categories: &BTreeSet<CategoryId>) -> Result<()> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let exists: bool = sqlx::query_scalar(include_str!("../queries/video_exists.sql"))
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if !exists {
            exn::bail!(ErrorKind::NotFound(format!("video {id}")));
        }
        sqlx::query(include_str!("../queries/delete_video_categories.sql"))
            .bind(id.0)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Self::link_categories(&mut tx, id, categories).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    // =========================================================================
    // Videos: reads
    // =========================================================================

    async fn get(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        let row: Option<VideoRow> = sqlx::query_as(include_str!("../queries/get_video_by_id.sql"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(VideoRecord::try_from).transpose()
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<VideoRecord>> {
        let row: Option<VideoRow> = sqlx::query_as(include_str!("../queries/get_video_by_slug.sql"))
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(VideoRecord::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        let rows: Vec<VideoRow> = sqlx::query_as(include_str!("../queries/list_videos.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        into_records(rows)
    }

    async fn list_public(&self, now: UtcDateTime) -> Result<Vec<VideoRecord>> {
        let rows: Vec<VideoRow> = sqlx::query_as(include_str!("../queries/list_public_videos.sql"))
            .bind(now.unix_timestamp())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        into_records(rows)
    }

    async fn list_in_category(&self, slug: &Slug) -> Result<Vec<VideoRecord>> {
        let rows: Vec<VideoRow> = sqlx::query_as(include_str!("../queries/list_videos_in_category.sql"))
            .bind(slug.as_str())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        into_records(rows)
    }

    async fn latest(&self) -> Result<Option<VideoRecord>> {
        let row: Option<VideoRow> = sqlx::query_as(include_str!("../queries/latest_video.sql"))
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(VideoRecord::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: VideoId) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_video.sql"))
            .bind(id.0)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    #[instrument(skip_all, fields(slug = %category.slug))]
    async fn create_category(&self, category: &NewCategory) -> Result<Category> {
        let result = sqlx::query(include_str!("../queries/insert_category.sql"))
            .bind(&category.title)
            .bind(category.slug.as_str())
            .bind(&category.description)
            .execute(&self.pool)
            .await
            .or_else(|e| raise_write(e, Some(&category.slug), String::new))?;
        Ok(category.clone().into_category(CategoryId(result.last_insert_rowid())))
    }

    #[instrument(skip_all, fields(id = %category.id, slug = %category.slug))]
    async fn update_category(&self, category: &Category) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/update_category.sql"))
            .bind(&category.title)
            .bind(category.slug.as_str())
            .bind(&category.description)
            .bind(category.id.0)
            .execute(&self.pool)
            .await
            .or_else(|e| raise_write(e, Some(&category.slug), String::new))?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::NotFound(format!("category {}", category.id)));
        }
        Ok(())
    }

    async fn get_category_by_slug(&self, slug: &Slug) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(include_str!("../queries/get_category_by_slug.sql"))
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Category::try_from).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(include_str!("../queries/list_categories.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Category::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_category.sql"))
            .bind(id.0)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
