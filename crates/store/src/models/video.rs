use super::{PayloadRow, from_timestamp};
use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use serde_json::{from_str as from_json, to_string as to_json};
use videostream_model::models::{CategoryId, Slug, Stamps, Tags, Variant, VideoId, VideoMeta, VideoRecord};

/// One row of the `video_details` view: the base record joined with its
/// payload and category links.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VideoRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) tags: String,
    pub(crate) description: Option<String>,
    pub(crate) is_public: bool,
    pub(crate) allow_comments: bool,
    pub(crate) publish_at: Option<i64>,
    pub(crate) created_at: i64,
    pub(crate) modified_at: i64,
    #[sqlx(flatten)]
    pub(crate) payload: PayloadRow,
    pub(crate) category_ids: String,
}
impl TryFrom<VideoRow> for VideoRecord {
    type Error = Error;
    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        let slug = Slug::new(row.slug).or_raise(|| ErrorKind::InvalidData("slug"))?;
        let variant = Variant::try_from(row.payload)?;
        let mut meta = VideoMeta::new(row.title, slug, variant);
        let names = from_json::<Vec<String>>(&row.tags).or_raise(|| ErrorKind::InvalidData("tags"))?;
        meta.tags = Tags::from_names(names).or_raise(|| ErrorKind::InvalidData("tags"))?;
        meta.categories = from_json::<Vec<i64>>(&row.category_ids)
            .or_raise(|| ErrorKind::InvalidData("category ids"))?
            .into_iter()
            .map(CategoryId)
            .collect();
        meta.description = row.description;
        meta.is_public = row.is_public;
        meta.allow_comments = row.allow_comments;
        meta.publish_at = row.publish_at.map(|ts| from_timestamp(ts, "publish date")).transpose()?;
        let stamps = Stamps {
            id: VideoId(row.id),
            created_at: from_timestamp(row.created_at, "creation date")?,
            modified_at: from_timestamp(row.modified_at, "modification date")?,
        };
        Ok(VideoRecord::restore(meta, stamps))
    }
}

/// Editor-controlled columns of the `videos` table, shared by inserts and
/// updates.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BaseRow {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) tags: String,
    pub(crate) description: Option<String>,
    pub(crate) is_public: bool,
    pub(crate) allow_comments: bool,
    pub(crate) publish_at: Option<i64>,
}
impl TryFrom<&VideoMeta> for BaseRow {
    type Error = Error;
    fn try_from(meta: &VideoMeta) -> Result<Self, Self::Error> {
        Ok(Self {
            title: meta.title.clone(),
            slug: meta.slug.to_string(),
            tags: to_json(&meta.tags.iter().collect::<Vec<_>>()).or_raise(|| ErrorKind::InvalidData("tags"))?,
            description: meta.description.clone(),
            is_public: meta.is_public,
            allow_comments: meta.allow_comments,
            publish_at: meta.publish_at.map(|t| t.unix_timestamp()),
        })
    }
}
