use super::{Slug, VideoId};
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::{Month, UtcDateTime};

/// Canonical location of a video, derived from its stored fields.
///
/// The route grammar belongs to whoever serves the URLs; [`Display`] renders
/// the default `/{year}/{mon}/{day}/{slug}/` and `/{id}/` shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permalink {
    Dated { year: i32, month: Month, day: u8, slug: Slug },
    ById(VideoId),
}
impl Permalink {
    pub fn dated(published: UtcDateTime, slug: Slug) -> Self {
        Self::Dated {
            year: published.year(),
            month: published.month(),
            day: published.day(),
            slug,
        }
    }
}
impl Display for Permalink {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Permalink::Dated { year, month, day, slug } => {
                write!(f, "/{year:04}/{}/{day:02}/{slug}/", month_abbrev(*month))
            },
            Permalink::ById(id) => write!(f, "/{id}/"),
        }
    }
}

/// Lowercase three-letter English month abbreviation (`jan`..`dec`).
pub fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "jan",
        Month::February => "feb",
        Month::March => "mar",
        Month::April => "apr",
        Month::May => "may",
        Month::June => "jun",
        Month::July => "jul",
        Month::August => "aug",
        Month::September => "sep",
        Month::October => "oct",
        Month::November => "nov",
        Month::December => "dec",
    }
}
