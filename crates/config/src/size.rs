use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Dimensions of the embedded video player, written as `"<width>x<height>"`.
///
/// ```
/// use videostream_config::PlayerSize;
///
/// let size: PlayerSize = "640x360".parse().unwrap();
/// assert_eq!(size.style(), "width: 640px; height: 360px;");
/// assert!("640".parse::<PlayerSize>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerSize {
    pub width: u32,
    pub height: u32,
}
impl PlayerSize {
    pub const DEFAULT: PlayerSize = PlayerSize { width: 320, height: 240 };

    /// Inline CSS for the player element.
    pub fn style(&self) -> String {
        format!("width: {}px; height: {}px;", self.width, self.height)
    }
}
impl Default for PlayerSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}
impl FromStr for PlayerSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ErrorKind::ConfigFormat { field: "player size", value: s.to_string() };
        let parts: Vec<&str> = s.split('x').collect();
        let [width, height] = parts.as_slice() else {
            exn::bail!(invalid());
        };
        let dimension = |part: &str| match part.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(invalid()),
        };
        Ok(Self { width: dimension(width)?, height: dimension(height)? })
    }
}
impl TryFrom<String> for PlayerSize {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<PlayerSize> for String {
    fn from(size: PlayerSize) -> Self {
        size.to_string()
    }
}
impl Display for PlayerSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}
