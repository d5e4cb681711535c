use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Container format of a self-hosted video file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Ogg Theora (`video/ogg`)
    Ogg,
    /// WebM (`video/webm`)
    #[default]
    Webm,
    /// MPEG-4 (`video/mp4`)
    Mp4,
    /// Flash video (`video/flv`)
    Flash,
}
impl MediaKind {
    pub const ALL: [MediaKind; 4] = [MediaKind::Ogg, MediaKind::Webm, MediaKind::Mp4, MediaKind::Flash];

    /// Returns the MIME label shown to players and editors.
    ///
    /// Older data carried `vidoe/mp4` for MP4 files. That label is accepted
    /// when parsing but never produced.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Ogg => "video/ogg",
            MediaKind::Webm => "video/webm",
            MediaKind::Mp4 => "video/mp4",
            MediaKind::Flash => "video/flv",
        }
    }

    /// Returns the short name, also used as the file extension.
    pub fn as_short_str(&self) -> &'static str {
        match self {
            MediaKind::Ogg => "ogg",
            MediaKind::Webm => "webm",
            MediaKind::Mp4 => "mp4",
            MediaKind::Flash => "flv",
        }
    }

    /// Stable integer code used for storage.
    pub fn code(&self) -> u8 {
        match self {
            MediaKind::Ogg => 0,
            MediaKind::Webm => 1,
            MediaKind::Mp4 => 2,
            MediaKind::Flash => 3,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, Error> {
        Ok(match code {
            0 => Self::Ogg,
            1 => Self::Webm,
            2 => Self::Mp4,
            3 => Self::Flash,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "media kind",
                value: format!("unknown media kind code: {code}"),
            }),
        })
    }
}
impl FromStr for MediaKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sanitized = sanitize(s);
        Ok(match sanitized.as_str() {
            "ogg" | "ogv" | "videoogg" => Self::Ogg,
            "webm" | "videowebm" => Self::Webm,
            "mp4" | "videomp4" | "vidoemp4" => Self::Mp4,
            "flash" | "flv" | "videoflv" => Self::Flash,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "media kind",
                value: format!("unknown media kind: {}", s)
            }),
        })
    }
}
impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MediaKind::Ogg, "video/ogg")]
    #[case(MediaKind::Webm, "video/webm")]
    #[case(MediaKind::Mp4, "video/mp4")]
    #[case(MediaKind::Flash, "video/flv")]
    fn test_label(#[case] kind: MediaKind, #[case] expected: &str) {
        assert_eq!(kind.label(), expected);
        assert_eq!(kind.to_string(), expected);
    }

    #[rstest]
    #[case("ogg", MediaKind::Ogg)]
    #[case("WEBM", MediaKind::Webm)]
    #[case("video/mp4", MediaKind::Mp4)]
    #[case("vidoe/mp4", MediaKind::Mp4)]
    #[case(" flash ", MediaKind::Flash)]
    #[case("flv", MediaKind::Flash)]
    fn test_from_str(#[case] input: &str, #[case] expected: MediaKind) {
        assert_eq!(input.parse::<MediaKind>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("avi")]
    #[case("video/quicktime")]
    fn test_from_str_invalid(#[case] input: &str) {
        assert!(input.parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_default_is_webm() {
        assert_eq!(MediaKind::default(), MediaKind::Webm);
    }

    #[test]
    fn test_codes_are_stable() {
        for kind in MediaKind::ALL {
            assert_eq!(MediaKind::from_code(kind.code()).unwrap(), kind);
        }
        assert_eq!(MediaKind::Mp4.code(), 2);
        let err = MediaKind::from_code(4).unwrap_err();
        assert!(matches!(&*err, ErrorKind::ParseError { field: "media kind", .. }));
    }
}
