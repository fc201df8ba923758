//! Layered configuration for photoroute.
//!
//! Values are resolved with [`figment`], lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. The user's config file in the platform config directory, if it exists.
//! 3. `photoroute.toml` in the working directory, or an explicitly requested
//!    file (which then *must* exist).
//! 4. `PHOTOROUTE_*` environment variables, with `__` separating nested keys
//!    (e.g. `PHOTOROUTE_TRANSCODE__SCALE_WIDTH=800`).
//!
//! Config files may be TOML, YAML or JSON; the format is picked from the
//! file extension.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Config file looked up in the current working directory when no explicit
/// file is given.
pub const LOCAL_CONFIG_FILE: &str = "photoroute.toml";
/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "PHOTOROUTE_";

const MAX_QUALITY: u8 = 31;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned (non-recursively) for source photographs.
    pub source_dir: PathBuf,
    /// Base directory under which one directory per dataset is created.
    pub dest_base: PathBuf,
    /// JSON routing table mapping service codes to dataset identifiers.
    pub routes: PathBuf,
    /// Image extensions picked up by discovery, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Persistent log file, appended to on every run.
    pub log_file: Option<PathBuf>,
    pub transcode: TranscodeConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("photos_for_processing"),
            dest_base: PathBuf::from("public/images"),
            routes: PathBuf::from("src/assets/routes.json"),
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            log_file: Some(PathBuf::from("image_processing.log")),
            transcode: TranscodeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Program name (looked up in `PATH`) or path to the ffmpeg executable.
    pub program: String,
    /// Output width in pixels; height follows the aspect ratio.
    pub scale_width: u32,
    /// JPEG quality scale passed as `-q:v`. Lower is better, 2-5 is sensible.
    pub quality: u8,
}
impl Default for TranscodeConfig {
    fn default() -> Self {
        Self { program: "ffmpeg".to_string(), scale_width: 1000, quality: 3 }
    }
}

/// A config file layered on top of the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Merged if present, silently ignored otherwise.
    Optional(PathBuf),
    /// Must exist, otherwise loading fails with [`ErrorKind::NotFound`].
    Required(PathBuf),
}
impl Source {
    fn path(&self) -> &Path {
        match self {
            Self::Optional(p) | Self::Required(p) => p,
        }
    }
}

/// Location of the per-user config file, e.g. `~/.config/photoroute/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "photoroute").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Loads configuration from the standard locations (see [module docs](crate)).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut sources = Vec::with_capacity(2);
        if let Some(user) = user_config_path() {
            sources.push(Source::Optional(user));
        }
        sources.push(match explicit {
            Some(path) => Source::Required(path.to_path_buf()),
            None => Source::Optional(PathBuf::from(LOCAL_CONFIG_FILE)),
        });
        Self::from_sources(sources, Some(ENV_PREFIX))
    }

    /// Merges the given sources, in order, over the defaults and then applies
    /// environment overrides (when `env_prefix` is given).
    pub fn from_sources(sources: impl IntoIterator<Item = Source>, env_prefix: Option<&str>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        for source in sources {
            let path = source.path().to_path_buf();
            if !path.is_file() {
                match source {
                    Source::Required(_) => exn::bail!(ErrorKind::NotFound(path)),
                    Source::Optional(_) => continue,
                }
            }
            tracing::debug!(path = %path.display(), "Merging configuration file");
            figment = match format_of(&path)? {
                FileFormat::Toml => figment.merge(Toml::file(&path)),
                FileFormat::Yaml => figment.merge(Yaml::file(&path)),
                FileFormat::Json => figment.merge(Json::file(&path)),
            };
        }
        if let Some(prefix) = env_prefix {
            figment = figment.merge(Env::prefixed(prefix).split("__"));
        }
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()
    }

    /// Checks ranges and normalizes the extension list (lowercase, no leading dot).
    pub fn validate(mut self) -> Result<Self> {
        if self.transcode.scale_width == 0 {
            exn::bail!(ErrorKind::Invalid("scale width must be greater than zero".to_string()));
        }
        if !(1..=MAX_QUALITY).contains(&self.transcode.quality) {
            exn::bail!(ErrorKind::Invalid(format!("quality must be between 1 and {MAX_QUALITY}")));
        }
        if self.transcode.program.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("transcoder program must not be empty".to_string()));
        }
        self.extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        if self.extensions.is_empty() || self.extensions.iter().any(String::is_empty) {
            exn::bail!(ErrorKind::Invalid("image extensions must be a non-empty list of non-empty values".to_string()));
        }
        let mut seen = HashSet::new();
        self.extensions.retain(|ext| seen.insert(ext.clone()));
        Ok(self)
    }
}

enum FileFormat {
    Toml,
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<FileFormat> {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("toml") => Ok(FileFormat::Toml),
        Some("yaml" | "yml") => Ok(FileFormat::Yaml),
        Some("json") => Ok(FileFormat::Json),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    }
}
