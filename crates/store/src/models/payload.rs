use super::{handle_to_text, text_to_handle};
use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use videostream_model::models::{EmbeddedVideo, EncodedUploadVideo, MediaKind, SelfHostedVideo, Variant, VariantKind};

/// One row of `video_payloads`. Only the columns of the row's `kind` are
/// meaningful; the others are left `NULL`.
#[derive(Debug, Default, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct PayloadRow {
    pub(crate) kind: String,
    pub(crate) media_kind: Option<i64>,
    pub(crate) file_reference: Option<String>,
    pub(crate) source_url: Option<String>,
    pub(crate) embed_markup: Option<String>,
    pub(crate) source_upload: Option<String>,
    pub(crate) encoded_output: Option<String>,
    pub(crate) thumbnail: Option<String>,
    pub(crate) needs_encode: bool,
}
impl TryFrom<&Variant> for PayloadRow {
    type Error = Error;
    fn try_from(variant: &Variant) -> Result<Self, Self::Error> {
        let kind = variant.kind().as_str().to_string();
        Ok(match variant {
            Variant::SelfHosted(video) => Self {
                kind,
                media_kind: Some(i64::from(video.media_kind.code())),
                file_reference: handle_to_text(video.file_reference.as_ref(), "file reference")?,
                ..Self::default()
            },
            Variant::Embedded(video) => Self {
                kind,
                source_url: video.source_url.clone(),
                embed_markup: video.embed_markup.clone(),
                ..Self::default()
            },
            Variant::EncodedUpload(video) => Self {
                kind,
                source_upload: handle_to_text(video.source_upload.as_ref(), "source upload")?,
                encoded_output: handle_to_text(video.encoded_output.as_ref(), "encoded output")?,
                thumbnail: handle_to_text(video.thumbnail.as_ref(), "thumbnail")?,
                needs_encode: video.needs_encode,
                ..Self::default()
            },
        })
    }
}
impl TryFrom<PayloadRow> for Variant {
    type Error = Error;
    fn try_from(row: PayloadRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<VariantKind>().or_raise(|| ErrorKind::InvalidData("payload kind"))?;
        Ok(match kind {
            VariantKind::SelfHosted => {
                let media_kind = match row.media_kind {
                    Some(code) => u8::try_from(code)
                        .or_raise(|| ErrorKind::InvalidData("media kind"))
                        .and_then(|code| MediaKind::from_code(code).or_raise(|| ErrorKind::InvalidData("media kind")))?,
                    None => MediaKind::default(),
                };
                Variant::SelfHosted(SelfHostedVideo {
                    media_kind,
                    file_reference: text_to_handle(row.file_reference),
                })
            },
            VariantKind::Embedded => Variant::Embedded(EmbeddedVideo {
                source_url: row.source_url,
                embed_markup: row.embed_markup,
            }),
            VariantKind::EncodedUpload => Variant::EncodedUpload(EncodedUploadVideo {
                source_upload: text_to_handle(row.source_upload),
                encoded_output: text_to_handle(row.encoded_output),
                thumbnail: text_to_handle(row.thumbnail),
                needs_encode: row.needs_encode,
            }),
        })
    }
}
