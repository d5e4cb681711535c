use super::Slug;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Store-assigned category identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(pub i64);
impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// A category as typed in by an editor, before it has been stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub title: String,
    pub slug: Slug,
    pub description: Option<String>,
}
impl NewCategory {
    pub fn new(title: impl Into<String>, slug: Slug) -> Self {
        Self { title: title.into(), slug, description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            title: self.title,
            slug: self.slug,
            description: self.description,
        }
    }
}

/// A stored category. Shared by any number of videos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub slug: Slug,
    pub description: Option<String>,
}
impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.title)
    }
}
