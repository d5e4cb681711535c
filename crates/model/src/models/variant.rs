use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::{BlobHandle, MediaKind, sanitize};
use crate::error::{Error, ErrorKind};

/// A video file uploaded and served as-is to an HTML5 player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfHostedVideo {
    pub media_kind: MediaKind,
    pub file_reference: Option<BlobHandle>,
}

/// A video hosted elsewhere, shown through its URL or an embed snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedVideo {
    pub source_url: Option<String>,
    /// Use the embed markup instead of the URL if the frontend cannot embed
    /// from the URL alone.
    pub embed_markup: Option<String>,
}

/// An uploaded clip that an external tool encodes to Flash video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedUploadVideo {
    pub source_upload: Option<BlobHandle>,
    /// Already-encoded output; needs no encoding when uploaded directly.
    pub encoded_output: Option<BlobHandle>,
    pub thumbnail: Option<BlobHandle>,
    /// Encode (or re-encode) the clip on the next run of the encoder.
    pub needs_encode: bool,
}

/// The concrete media representation of a video. Every record holds exactly
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    SelfHosted(SelfHostedVideo),
    Embedded(EmbeddedVideo),
    EncodedUpload(EncodedUploadVideo),
}
impl Variant {
    pub fn kind(&self) -> VariantKind {
        match self {
            Variant::SelfHosted(_) => VariantKind::SelfHosted,
            Variant::Embedded(_) => VariantKind::Embedded,
            Variant::EncodedUpload(_) => VariantKind::EncodedUpload,
        }
    }

    pub fn as_self_hosted(&self) -> Option<&SelfHostedVideo> {
        match self {
            Variant::SelfHosted(video) => Some(video),
            _ => None,
        }
    }

    pub fn as_embedded(&self) -> Option<&EmbeddedVideo> {
        match self {
            Variant::Embedded(video) => Some(video),
            _ => None,
        }
    }

    pub fn as_encoded_upload(&self) -> Option<&EncodedUploadVideo> {
        match self {
            Variant::EncodedUpload(video) => Some(video),
            _ => None,
        }
    }

    /// Returns the MIME label of a self-hosted video's file.
    ///
    /// Only self-hosted payloads know their container format; any other
    /// payload returns [`ErrorKind::UnknownVariant`].
    pub fn video_type(&self) -> Result<&'static str, Error> {
        match self {
            Variant::SelfHosted(video) => Ok(video.media_kind.label()),
            other => exn::bail!(ErrorKind::UnknownVariant {
                expected: VariantKind::SelfHosted,
                found: other.kind(),
            }),
        }
    }
}
impl From<SelfHostedVideo> for Variant {
    fn from(video: SelfHostedVideo) -> Self {
        Self::SelfHosted(video)
    }
}
impl From<EmbeddedVideo> for Variant {
    fn from(video: EmbeddedVideo) -> Self {
        Self::Embedded(video)
    }
}
impl From<EncodedUploadVideo> for Variant {
    fn from(video: EncodedUploadVideo) -> Self {
        Self::EncodedUpload(video)
    }
}

/// Discriminant of [`Variant`], used for storage and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    SelfHosted,
    Embedded,
    EncodedUpload,
}
impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::SelfHosted => "self_hosted",
            VariantKind::Embedded => "embedded",
            VariantKind::EncodedUpload => "encoded_upload",
        }
    }
}
impl FromStr for VariantKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "selfhosted" | "html5" | "basic" => Self::SelfHosted,
            "embedded" | "embed" => Self::Embedded,
            "encodedupload" | "flash" => Self::EncodedUpload,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "variant",
                value: format!("unknown variant: {}", s)
            }),
        })
    }
}
impl Display for VariantKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
