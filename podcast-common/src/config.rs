//! Configuration loading and folder resolution
//!
//! Bootstrap configuration lives in a TOML file. Every folder setting is
//! resolved with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in default relative to the working directory

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that lets preview builds include future-dated posts
pub const INCLUDE_FUTURE_ENV: &str = "INCLUDE_FUTURE_POSTS";

pub const CONTENT_DIR_ENV: &str = "PODCAST_CONTENT_DIR";
pub const STAGING_DIR_ENV: &str = "PODCAST_STAGING_DIR";
pub const MEDIA_DIR_ENV: &str = "PODCAST_MEDIA_DIR";

const DEFAULT_CONTENT_DIR: &str = "content/blog";
const DEFAULT_MEDIA_BASE_URL: &str = "https://media.twistoflemonpod.com";
const DEFAULT_LEGACY_PREFIX: &str = "https://twistoflemonpod.s3.us-east-2.amazonaws.com/episodes/";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional in the file; missing sections fall back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root of the content store (posts and transcripts)
    #[serde(default)]
    pub content_dir: Option<PathBuf>,

    /// Folder where freshly produced transcripts wait, named after their media
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,

    /// Local mirror of the published media files
    #[serde(default)]
    pub media_dir: Option<PathBuf>,

    /// Include future-dated posts in collections
    #[serde(default)]
    pub include_future: Option<bool>,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub show: ShowConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub deepgram: DeepgramConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

/// Where published media lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Current public base URL for media files
    #[serde(default = "default_media_base_url")]
    pub base_url: String,

    /// URL prefixes of retired media hosts, each ending just before the file name
    #[serde(default = "default_legacy_prefixes")]
    pub legacy_prefixes: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_media_base_url(),
            legacy_prefixes: default_legacy_prefixes(),
        }
    }
}

/// Show details used in generated prompts and post bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowConfig {
    #[serde(default = "default_show_name")]
    pub name: String,
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
    /// Category assigned to newly created episodes
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Closing line of generated episode posts
    #[serde(default = "default_sign_off")]
    pub sign_off: String,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            name: default_show_name(),
            hosts: default_hosts(),
            topics: default_topics(),
            default_category: default_category(),
            sign_off: default_sign_off(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Speech-to-text provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepgramConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Text generation provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Object storage upload settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

fn default_media_base_url() -> String {
    DEFAULT_MEDIA_BASE_URL.to_string()
}

fn default_legacy_prefixes() -> Vec<String> {
    vec![DEFAULT_LEGACY_PREFIX.to_string()]
}

fn default_show_name() -> String {
    "Life with a Twist of Lemon".to_string()
}

fn default_hosts() -> Vec<String> {
    vec!["Jon Kohlmeier".to_string(), "Stan Lemon".to_string()]
}

fn default_topics() -> Vec<String> {
    ["Technology", "finance", "life", "craftsmanship", "theology"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_category() -> String {
    "Technology".to_string()
}

fn default_sign_off() -> String {
    "Stan Lemon & Jon Kohlmeier".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default configuration file path (`~/.config/podcast/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("podcast").join("config.toml"))
}

/// Load configuration from an explicit path, or the default path if present
///
/// An explicit path that does not exist is an error; a missing default file
/// yields the built-in defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config file found, using built-in defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Resolve a folder following CLI → environment → TOML → default priority
pub fn resolve_dir(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
    default: impl FnOnce() -> Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    if let Some(path) = toml_value {
        return Some(expand_tilde(path));
    }

    default()
}

/// Built-in content folder, relative to the working directory
pub fn default_content_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CONTENT_DIR)
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => {
            warn!("Cannot expand ~ without a home directory: {}", path.display());
            path.to_path_buf()
        }
    }
}

/// Resolve a secret from environment then TOML
///
/// Warns when both are set; the environment wins.
pub fn resolve_secret(env_var_name: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var_name)
        .ok()
        .filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v)).map(str::to_string);

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment and TOML config. Using environment (highest priority).",
            env_var_name
        );
    }

    env_value.or(toml_value)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Parse a boolean switch as written in an environment variable
pub fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
