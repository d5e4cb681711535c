//! Configuration loading and validation.
//!
//! Configuration is layered with [figment], later layers overriding earlier
//! ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file, either given explicitly or `config.toml` in the
//!    platform configuration directory. TOML, YAML and JSON are supported,
//!    picked by file extension.
//! 3. Environment variables prefixed with `VIDEOSTREAM_`, nested with `__`
//!    (e.g. `VIDEOSTREAM_STORAGE__ROOT=/srv/media`).
//! 4. `VIDEOSTREAM_SIZE`, the player size shorthand, mapped to `player.size`.
//!
//! Everything is validated while loading, so a malformed value stops the
//! program at startup instead of on first use.

pub mod error;
mod size;

pub use crate::size::PlayerSize;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Environment variable holding the player size shorthand.
pub const SIZE_VAR: &str = "VIDEOSTREAM_SIZE";
const ENV_PREFIX: &str = "VIDEOSTREAM_";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "videostream")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database file.
    pub database: PathBuf,
    pub storage: StorageConfig,
    pub player: PlayerConfig,
    pub routes: RouteConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Absolute directory that uploaded media is stored below.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: PlayerSize,
}

/// Route templates handed to the router, in [upon] syntax.
///
/// The dated template sees `year`, `month` (`jan`..`dec`), `day` (two digits)
/// and `slug`. The identifier template sees `id`, the category template
/// `slug` and `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub dated: String,
    pub by_id: String,
    pub category: String,
}
impl RouteConfig {
    pub const DATED: &str = "/{{ year }}/{{ month }}/{{ day }}/{{ slug }}/";
    pub const BY_ID: &str = "/{{ id }}/";
    pub const CATEGORY: &str = "/category/{{ slug }}/";
}
impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            dated: Self::DATED.to_string(),
            by_id: Self::BY_ID.to_string(),
            category: Self::CATEGORY.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data = project_dirs().map(|dirs| dirs.data_dir().to_path_buf()).unwrap_or_default();
        Self { root: data.join("media") }
    }
}

impl Default for Config {
    fn default() -> Self {
        let data = project_dirs().map(|dirs| dirs.data_dir().to_path_buf()).unwrap_or_default();
        Self {
            database: data.join("videostream.sqlite"),
            storage: StorageConfig::default(),
            player: PlayerConfig::default(),
            routes: RouteConfig::default(),
        }
    }
}

impl Config {
    /// Platform default location of the configuration file, if the platform
    /// has a home directory at all.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from every layer.
    ///
    /// An explicit `path` must exist; the default location is skipped
    /// silently when there is no file.
    #[instrument(skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let figment = match path {
            Some(path) if !path.is_file() => {
                exn::bail!(ErrorKind::Load(format!("no such file: {}", path.display())))
            },
            Some(path) => Self::figment(Some(path))?,
            None => Self::figment(Self::default_path().as_deref().filter(|p| p.is_file()))?,
        };
        Self::extract(&figment)
    }

    /// Build the layered [`Figment`] without extracting it.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            debug!(path = %file.display(), "merging configuration file");
            figment = match file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
                Some("toml") => figment.merge(Toml::file_exact(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
                Some("json") => figment.merge(Json::file_exact(file)),
                _ => exn::bail!(ErrorKind::Load(format!("unsupported configuration file: {}", file.display()))),
            };
        }
        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["size"]).split("__"))
            .merge(Env::raw().only(&[SIZE_VAR]).map(|_| "player.size".into())))
    }

    /// Validate and extract a [`Config`] from a figment.
    ///
    /// The player size is checked first so that a malformed value is reported
    /// as [`ConfigFormat`](ErrorKind::ConfigFormat) rather than as a generic
    /// load failure.
    pub fn extract(figment: &Figment) -> Result<Self> {
        let size: String = figment.extract_inner("player.size").or_raise(|| ErrorKind::Load("player.size".to_string()))?;
        size.parse::<PlayerSize>()?;
        figment.extract().or_raise(|| ErrorKind::Load("invalid configuration".to_string()))
    }
}

/// The inline player style for the configured size, e.g.
/// `"width: 320px; height: 240px;"`.
pub fn player_display_size(config: &Config) -> String {
    config.player.size.style()
}
