//! Route templates for canonical URLs.
//!
//! Renders [`Permalink`]s and categories into the paths an external router
//! serves, using configurable [upon] templates (`{{ variable }}`,
//! `{{ value|formatter }}`). Besides upon's built-ins a `slug` formatter is
//! available, which turns free text such as a title into a URL-safe slug.
//!
//! # Template Variables
//!
//! | Template   | Variable | Description                                  |
//! |------------|----------|----------------------------------------------|
//! | `dated`    | `year`   | Four-digit publish year                      |
//! | `dated`    | `month`  | Lowercase month abbreviation (`jan`..`dec`)  |
//! | `dated`    | `day`    | Two-digit day of month                       |
//! | `dated`    | `slug`   | The video slug                               |
//! | `by_id`    | `id`     | The store identifier                         |
//! | `category` | `slug`   | The category slug                            |
//! | `category` | `title`  | The category title                           |
//!
//! # Example
//!
//! ```
//! use videostream_config::RouteConfig;
//! use videostream_library::Router;
//! use videostream_model::models::{Permalink, VideoId};
//!
//! let routes = RouteConfig { by_id: "/watch/{{ id }}".to_string(), ..RouteConfig::default() };
//! let router = Router::new(&routes).unwrap();
//! assert_eq!(router.render(&Permalink::ById(VideoId(42))).unwrap(), "/watch/42");
//! ```

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use tracing::instrument;
use upon::{Engine, Template};
use videostream_config::RouteConfig;
use videostream_model::models::{Category, Permalink, VideoRecord, month_abbrev};

/// Renders canonical paths from compiled route templates.
///
/// All templates are compiled and test-rendered in [`new`](Self::new), so a
/// broken template stops the program at startup rather than on the first
/// request.
pub struct Router {
    engine: Engine<'static>,
    dated: Template<'static>,
    by_id: Template<'static>,
    category: Template<'static>,
}
impl Router {
    pub fn new(routes: &RouteConfig) -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let compile = |engine: &Engine<'static>, source: &str| {
            engine.compile(source.to_string()).or_raise(|| ErrorKind::Route)
        };
        let router = Self {
            dated: compile(&engine, &routes.dated)?,
            by_id: compile(&engine, &routes.by_id)?,
            category: compile(&engine, &routes.category)?,
            engine,
        };
        router.check()?;
        Ok(router)
    }

    /// Renders every template once with sample values, so that references to
    /// unknown variables are caught up front.
    fn check(&self) -> Result<()> {
        self.render_template(&self.dated, Self::dated_values(2000, "jan", 1, "sample"))?;
        self.render_template(&self.by_id, upon::value! { id: 1 })?;
        self.render_template(&self.category, upon::value! { slug: "sample", title: "Sample" })?;
        Ok(())
    }

    fn dated_values(year: i32, month: &str, day: u8, slug: &str) -> upon::Value {
        upon::value! {
            year: format!("{year:04}"),
            month: month,
            day: format!("{day:02}"),
            slug: slug,
        }
    }

    fn render_template(&self, template: &Template<'static>, values: upon::Value) -> Result<String> {
        let path = template.render(&self.engine, values).to_string().or_raise(|| ErrorKind::Route)?;
        Ok(path.trim().to_string())
    }

    /// Renders a structured permalink.
    pub fn render(&self, permalink: &Permalink) -> Result<String> {
        match permalink {
            Permalink::Dated { year, month, day, slug } => {
                self.render_template(&self.dated, Self::dated_values(*year, month_abbrev(*month), *day, slug))
            },
            Permalink::ById(id) => self.render_template(&self.by_id, upon::value! { id: id.0 }),
        }
    }

    /// The canonical URL of a stored video.
    ///
    /// Published videos are addressed by publish date and slug, anything
    /// else by identifier.
    #[instrument(skip_all, fields(id = %record.id()))]
    pub fn canonical_url(&self, record: &VideoRecord) -> Result<String> {
        self.render(&record.permalink())
    }

    pub fn category_url(&self, category: &Category) -> Result<String> {
        self.render_template(&self.category, upon::value! {
            slug: category.slug.as_str(),
            title: &category.title,
        })
    }
}
/// Custom [`upon`] extensions.
mod addons {
    use rslug::slugify;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Converts strings to URL-safe slugs, leaving other values alone.
    fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                let stripped: String = s.chars().filter(|c| !matches!(c, '\'' | '"' | '`')).collect();
                write!(f, "{}", slugify!(&stripped))?
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("slug", slug_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::{Date, Month, Time, UtcDateTime};
    use videostream_model::models::{CategoryId, EmbeddedVideo, Slug, Stamps, VideoId, VideoMeta};

    fn record(publish_at: Option<UtcDateTime>) -> VideoRecord {
        let created = UtcDateTime::new(Date::from_calendar_date(2024, Month::March, 1).unwrap(), Time::MIDNIGHT);
        let mut meta = VideoMeta::new("Intro Clip", Slug::new("intro-clip").unwrap(), EmbeddedVideo::default());
        meta.publish_at = publish_at;
        VideoRecord::restore(meta, Stamps { id: VideoId(17), created_at: created, modified_at: created })
    }

    fn march(day: u8) -> UtcDateTime {
        UtcDateTime::new(Date::from_calendar_date(2024, Month::March, day).unwrap(), Time::from_hms(9, 30, 0).unwrap())
    }

    #[test]
    fn test_default_routes_match_permalinks() {
        let router = Router::new(&RouteConfig::default()).unwrap();
        for publish_at in [Some(march(5)), None] {
            let record = record(publish_at);
            assert_eq!(router.canonical_url(&record).unwrap(), record.permalink().to_string());
        }
    }

    #[rstest]
    #[case::dated(Some(5), "/2024/mar/05/intro-clip/")]
    #[case::by_id(None, "/17/")]
    fn test_canonical_url(#[case] day: Option<u8>, #[case] expected: &str) {
        let router = Router::new(&RouteConfig::default()).unwrap();
        assert_eq!(router.canonical_url(&record(day.map(march))).unwrap(), expected);
    }

    #[test]
    fn test_canonical_url_is_deterministic() {
        let router = Router::new(&RouteConfig::default()).unwrap();
        let a = router.canonical_url(&record(Some(march(5)))).unwrap();
        let b = router.canonical_url(&record(Some(march(5)))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_templates() {
        let routes = RouteConfig {
            dated: "/videos/{{ year }}-{{ month }}/{{ slug }}".to_string(),
            by_id: "/v/{{ id }}".to_string(),
            category: "/topics/{{ title|slug }}/".to_string(),
        };
        let router = Router::new(&routes).unwrap();
        assert_eq!(router.canonical_url(&record(Some(march(5)))).unwrap(), "/videos/2024-mar/intro-clip");
        assert_eq!(router.canonical_url(&record(None)).unwrap(), "/v/17");
        let category = Category {
            id: CategoryId(1),
            title: "Conference \"Talks\"".to_string(),
            slug: Slug::new("talks").unwrap(),
            description: None,
        };
        assert_eq!(router.category_url(&category).unwrap(), "/topics/conference-talks/");
        let router = Router::new(&RouteConfig::default()).unwrap();
        assert_eq!(router.category_url(&category).unwrap(), "/category/talks/");
    }

    #[rstest]
    #[case::syntax("/{{ year }/")]
    #[case::unknown_variable("/{{ author }}/")]
    fn test_invalid_templates_fail_fast(#[case] dated: &str) {
        let routes = RouteConfig { dated: dated.to_string(), ..RouteConfig::default() };
        let err = Router::new(&routes).err().unwrap();
        assert!(matches!(&*err, ErrorKind::Route));
    }
}
