use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use videostream_model::models::{Category, CategoryId, Slug};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CategoryRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
}
impl TryFrom<CategoryRow> for Category {
    type Error = Error;
    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CategoryId(row.id),
            title: row.title,
            slug: Slug::new(row.slug).or_raise(|| ErrorKind::InvalidData("category slug"))?,
            description: row.description,
        })
    }
}
