//! Subcommands operating on an opened [`Library`].

use crate::error::{ErrorKind, Result};
use clap::{Args, Subcommand};
use exn::ResultExt;
use std::collections::BTreeSet;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcDateTime};
use videostream_config::{Config, player_display_size};
use videostream_library::{Library, MediaSlot, resolve_variant_type};
use videostream_model::models::{
    CategoryId, Draft, EmbeddedVideo, EncodedUploadVideo, MediaKind, NewCategory, SelfHostedVideo, Slug, Tags,
    Variant, VideoMeta, VideoRecord,
};

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// Create a category
    Add {
        title: String,
        /// Defaults to the slugified title
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List categories by title
    List,
    /// Delete a category; its videos are kept
    Remove { slug: String },
}

#[derive(Subcommand)]
pub enum VideoCommand {
    /// Create a video
    Add {
        title: String,
        /// Defaults to the slugified title
        #[arg(long)]
        slug: Option<String>,
        /// Space or comma separated, quotes group words
        #[arg(long)]
        tags: Option<String>,
        /// Category slug, may be repeated
        #[arg(long = "category", value_name = "SLUG")]
        categories: Vec<String>,
        #[arg(long)]
        description: Option<String>,
        /// Publish right away
        #[arg(long)]
        public: bool,
        #[arg(long)]
        allow_comments: bool,
        /// Publish date, e.g. 2024-03-05T09:00:00Z
        #[arg(long, value_name = "RFC3339", value_parser = parse_publish_at)]
        publish_at: Option<UtcDateTime>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Change a video's title, tags, description, comments or publish date
    Edit {
        slug: String,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// List videos, newest first
    List {
        /// Only videos visitors can currently see
        #[arg(long)]
        public: bool,
        /// Only videos filed under this category slug
        #[arg(long, value_name = "SLUG")]
        category: Option<String>,
    },
    /// Show a video with its canonical URL
    Show { slug: String },
    /// Make a video public
    Publish { slug: String },
    /// Hide a video, keeping its publish date
    Unpublish { slug: String },
    /// Upload a file into one of the video's media slots
    Attach {
        slug: String,
        /// html5, flash-source, flash-encoded or flash-thumbnail
        slot: String,
        file: PathBuf,
    },
    /// Delete a video; media files are kept
    Remove { slug: String },
}

/// Where a new video's media comes from.
#[derive(Args)]
///
/// An embedded video may carry both a URL and a snippet.
#[group(required = true, multiple = true)]
pub struct SourceArgs {
    /// Embed a video from a URL
    #[arg(long, value_name = "URL")]
    embed_url: Option<String>,
    /// Embed a video from an HTML snippet
    #[arg(long, value_name = "HTML")]
    embed_code: Option<String>,
    /// Self-host an HTML5 video (ogg, webm, mp4 or flash)
    #[arg(long, value_name = "KIND", conflicts_with_all = ["embed_url", "embed_code", "flash"])]
    html5: Option<String>,
    /// Upload a Flash video for encoding
    #[arg(long, conflicts_with_all = ["embed_url", "embed_code"])]
    flash: bool,
}
impl SourceArgs {
    fn into_variant(self) -> Result<Variant> {
        if let Some(kind) = self.html5 {
            let media_kind = kind.parse::<MediaKind>().or_raise(|| ErrorKind::Argument("media kind"))?;
            return Ok(SelfHostedVideo { media_kind, file_reference: None }.into());
        }
        if self.flash {
            return Ok(EncodedUploadVideo::default().into());
        }
        Ok(EmbeddedVideo { source_url: self.embed_url, embed_markup: self.embed_code }.into())
    }
}

/// Base fields `video edit` may change; unset options are left alone.
#[derive(Args)]
pub struct EditArgs {
    #[arg(long)]
    title: Option<String>,
    /// Replaces all tags; an empty value clears them
    #[arg(long)]
    tags: Option<String>,
    /// An empty value clears the description
    #[arg(long)]
    description: Option<String>,
    #[arg(long, conflicts_with = "no_comments")]
    allow_comments: bool,
    #[arg(long)]
    no_comments: bool,
    #[arg(long, value_name = "RFC3339", value_parser = parse_publish_at)]
    publish_at: Option<UtcDateTime>,
}
impl EditArgs {
    fn apply(self, meta: &mut VideoMeta) -> Result<()> {
        if let Some(title) = self.title {
            meta.title = title;
        }
        if let Some(tags) = self.tags {
            meta.tags = tags.parse::<Tags>().or_raise(|| ErrorKind::Argument("tags"))?;
        }
        if let Some(description) = self.description {
            meta.description = Some(description).filter(|d| !d.is_empty());
        }
        if self.allow_comments {
            meta.allow_comments = true;
        } else if self.no_comments {
            meta.allow_comments = false;
        }
        if let Some(publish_at) = self.publish_at {
            meta.publish_at = Some(publish_at);
        }
        Ok(())
    }
}

fn parse_publish_at(value: &str) -> std::result::Result<UtcDateTime, String> {
    let parsed = OffsetDateTime::parse(value, &Rfc3339).map_err(|e| e.to_string())?;
    UtcDateTime::from_unix_timestamp(parsed.unix_timestamp()).map_err(|e| e.to_string())
}

fn parse_slug(value: &str) -> Result<Slug> {
    value.parse::<Slug>().or_raise(|| ErrorKind::Argument("slug"))
}

fn slug_or_title(slug: Option<&str>, title: &str) -> Result<Slug> {
    match slug {
        Some(slug) => parse_slug(slug),
        None => Slug::from_title(title).or_raise(|| ErrorKind::Argument("title")),
    }
}

async fn find_video(library: &Library, slug: &str) -> Result<VideoRecord> {
    library.require(&parse_slug(slug)?).await.or_raise(|| ErrorKind::Command)
}

impl CategoryCommand {
    pub async fn run(self, library: &Library) -> Result<()> {
        match self {
            CategoryCommand::Add { title, slug, description } => {
                let mut category = NewCategory::new(title.clone(), slug_or_title(slug.as_deref(), &title)?);
                if let Some(description) = description {
                    category = category.with_description(description);
                }
                let category = library.create_category(&category).await.or_raise(|| ErrorKind::Command)?;
                println!("{}\t{}", category.id, library.category_url(&category).or_raise(|| ErrorKind::Command)?);
            },
            CategoryCommand::List => {
                for category in library.list_categories().await.or_raise(|| ErrorKind::Command)? {
                    println!("{}\t{}\t{}", category.id, category.slug, category.title);
                }
            },
            CategoryCommand::Remove { slug } => {
                let slug = parse_slug(&slug)?;
                let deleted = match library.get_category_by_slug(&slug).await.or_raise(|| ErrorKind::Command)? {
                    Some(category) => library.delete_category(category.id).await.or_raise(|| ErrorKind::Command)?,
                    None => false,
                };
                if !deleted {
                    exn::bail!(ErrorKind::Argument("category"));
                }
            },
        }
        Ok(())
    }
}

impl VideoCommand {
    pub async fn run(self, library: &Library, config: &Config) -> Result<()> {
        match self {
            VideoCommand::Add {
                title,
                slug,
                tags,
                categories,
                description,
                public,
                allow_comments,
                publish_at,
                source,
            } => {
                let slug = slug_or_title(slug.as_deref(), &title)?;
                let mut meta = VideoMeta::new(title, slug, source.into_variant()?);
                if let Some(tags) = tags {
                    meta.tags = tags.parse::<Tags>().or_raise(|| ErrorKind::Argument("tags"))?;
                }
                meta.categories = resolve_categories(library, &categories).await?;
                meta.description = description;
                meta.is_public = public;
                meta.allow_comments = allow_comments;
                meta.publish_at = publish_at;
                let draft: VideoRecord<Draft> = meta.into();
                let record = library.create(&draft).await.or_raise(|| ErrorKind::Command)?;
                println!("{}\t{}", record.id(), library.canonical_url(&record).or_raise(|| ErrorKind::Command)?);
            },
            VideoCommand::Edit { slug, fields } => {
                let mut record = find_video(library, &slug).await?;
                fields.apply(&mut record)?;
                library.update(&mut record).await.or_raise(|| ErrorKind::Command)?;
                println!("{}", library.canonical_url(&record).or_raise(|| ErrorKind::Command)?);
            },
            VideoCommand::List { public, category } => {
                let videos = match (public, category) {
                    (_, Some(category)) => library.list_in_category(&parse_slug(&category)?).await,
                    (true, None) => library.list_public().await,
                    (false, None) => library.list().await,
                }
                .or_raise(|| ErrorKind::Command)?;
                for video in videos {
                    let status = if video.is_public { "public" } else { "hidden" };
                    println!("{}\t{}\t{}\t{}\t{}", video.id(), video.slug, video.variant.kind(), status, video.title);
                }
            },
            VideoCommand::Show { slug } => {
                let record = find_video(library, &slug).await?;
                println!("title:     {}", record.title);
                println!("slug:      {}", record.slug);
                println!("url:       {}", library.canonical_url(&record).or_raise(|| ErrorKind::Command)?);
                println!("kind:      {}", record.variant.kind());
                if let Ok(video_type) = resolve_variant_type(&record) {
                    println!("type:      {video_type}");
                }
                println!("public:    {}", record.is_public);
                if let Some(publish_at) = record.publish_at {
                    println!("published: {publish_at}");
                }
                println!("modified:  {}", record.modified_at());
                if !record.tags.is_empty() {
                    println!("tags:      {}", record.tags);
                }
                println!("player:    {}", player_display_size(config));
            },
            VideoCommand::Publish { slug } => {
                let mut record = find_video(library, &slug).await?;
                library.publish(&mut record).await.or_raise(|| ErrorKind::Command)?;
                println!("{}", library.canonical_url(&record).or_raise(|| ErrorKind::Command)?);
            },
            VideoCommand::Unpublish { slug } => {
                let mut record = find_video(library, &slug).await?;
                library.unpublish(&mut record).await.or_raise(|| ErrorKind::Command)?;
            },
            VideoCommand::Attach { slug, slot, file } => {
                let slot = slot.parse::<MediaSlot>().or_raise(|| ErrorKind::Argument("media slot"))?;
                let mut record = find_video(library, &slug).await?;
                let data = tokio::fs::read(&file).await.or_raise(|| ErrorKind::Read(file.clone()))?;
                let file_name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                let handle =
                    library.attach_media(&mut record, slot, &file_name, &data).await.or_raise(|| ErrorKind::Command)?;
                println!("{handle}");
            },
            VideoCommand::Remove { slug } => {
                let record = find_video(library, &slug).await?;
                library.delete(record.id()).await.or_raise(|| ErrorKind::Command)?;
            },
        }
        Ok(())
    }
}

async fn resolve_categories(library: &Library, slugs: &[String]) -> Result<BTreeSet<CategoryId>> {
    let mut ids = BTreeSet::new();
    for slug in slugs {
        match library.get_category_by_slug(&parse_slug(slug)?).await.or_raise(|| ErrorKind::Command)? {
            Some(category) => ids.insert(category.id),
            None => exn::bail!(ErrorKind::Argument("category")),
        };
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use videostream_model::models::VariantKind;

    #[derive(Parser)]
    struct Cli {
        #[command(subcommand)]
        command: VideoCommand,
    }

    fn parse(args: &[&str]) -> std::result::Result<VideoCommand, clap::Error> {
        Ok(Cli::try_parse_from(["videostream"].iter().chain(args))?.command)
    }

    fn parse_add(args: &[&str]) -> std::result::Result<SourceArgs, clap::Error> {
        match parse(&[&["add", "Intro Clip"][..], args].concat())? {
            VideoCommand::Add { source, .. } => Ok(source),
            _ => unreachable!(),
        }
    }

    fn parse_edit(args: &[&str]) -> std::result::Result<EditArgs, clap::Error> {
        match parse(&[&["edit", "intro-clip"][..], args].concat())? {
            VideoCommand::Edit { fields, .. } => Ok(fields),
            _ => unreachable!(),
        }
    }

    fn march_5_9am() -> UtcDateTime {
        UtcDateTime::new(
            time::Date::from_calendar_date(2024, time::Month::March, 5).unwrap(),
            time::Time::from_hms(9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_source_selects_variant() {
        let variant = parse_add(&["--html5", "mp4"]).unwrap().into_variant().unwrap();
        assert_eq!(variant.video_type().unwrap(), "video/mp4");
        let variant = parse_add(&["--flash"]).unwrap().into_variant().unwrap();
        assert_eq!(variant.kind(), VariantKind::EncodedUpload);
        let variant = parse_add(&["--embed-url", "https://example.com/v/1"]).unwrap().into_variant().unwrap();
        assert_eq!(variant.as_embedded().unwrap().source_url.as_deref(), Some("https://example.com/v/1"));
    }

    #[test]
    fn test_source_is_required_and_exclusive() {
        assert!(parse_add(&[]).is_err());
        assert!(parse_add(&["--flash", "--html5", "webm"]).is_err());
        assert!(parse_add(&["--html5", "mp4", "--embed-url", "https://example.com/v/1"]).is_err());
        assert!(parse_add(&["--flash", "--embed-code", "<iframe></iframe>"]).is_err());
    }

    #[test]
    fn test_embed_url_and_code_together() {
        let args = ["--embed-url", "https://example.com/v/1", "--embed-code", "<iframe></iframe>"];
        let variant = parse_add(&args).unwrap().into_variant().unwrap();
        let embedded = variant.as_embedded().unwrap();
        assert_eq!(embedded.source_url.as_deref(), Some("https://example.com/v/1"));
        assert_eq!(embedded.embed_markup.as_deref(), Some("<iframe></iframe>"));
    }

    #[test]
    fn test_add_publish_at() {
        let command = parse(&["add", "Intro Clip", "--flash", "--publish-at", "2024-03-05T10:00:00.250+01:00"]).unwrap();
        let VideoCommand::Add { publish_at, .. } = command else { unreachable!() };
        assert_eq!(publish_at, Some(march_5_9am()));
        assert!(parse(&["add", "Intro Clip", "--flash", "--publish-at", "5 March"]).is_err());
    }

    #[test]
    fn test_edit_changes_only_given_fields() {
        let mut meta = VideoMeta::new("Intro Clip", Slug::new("intro-clip").unwrap(), EmbeddedVideo::default());
        meta.description = Some("old".to_string());
        meta.allow_comments = true;
        let before = meta.clone();
        parse_edit(&[]).unwrap().apply(&mut meta).unwrap();
        assert_eq!(meta, before);

        let args = [
            "--title",
            "Outro",
            "--tags",
            "a,b",
            "--description",
            "",
            "--no-comments",
            "--publish-at",
            "2024-03-05T09:00:00Z",
        ];
        parse_edit(&args).unwrap().apply(&mut meta).unwrap();
        assert_eq!(meta.title, "Outro");
        assert_eq!(meta.tags, "a b".parse::<Tags>().unwrap());
        assert_eq!(meta.description, None);
        assert!(!meta.allow_comments);
        assert_eq!(meta.publish_at, Some(march_5_9am()));
        assert_eq!(meta.slug, before.slug);
    }

    #[test]
    fn test_edit_comment_flags_conflict() {
        assert!(parse_edit(&["--allow-comments", "--no-comments"]).is_err());
    }

    #[test]
    fn test_unknown_media_kind() {
        let err = parse_add(&["--html5", "avi"]).unwrap().into_variant().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Argument("media kind")));
    }

    #[test]
    fn test_slug_defaults_to_title() {
        assert_eq!(slug_or_title(None, "Intro Clip").unwrap().as_str(), "intro-clip");
        assert_eq!(slug_or_title(Some("custom"), "Intro Clip").unwrap().as_str(), "custom");
    }
}
