//! Runtime settings for podcast-reconcile
//!
//! Folders resolve CLI → environment → TOML → default; credentials resolve
//! environment → TOML. Everything is resolved once at startup and passed
//! down, so operations never read process state.

use crate::adapters::{AdapterError, DeepgramClient, HttpUploader, OllamaClient};
use podcast_common::config::{
    default_content_dir, parse_bool_flag, resolve_dir, resolve_secret, MediaConfig, ShowConfig,
    TomlConfig, CONTENT_DIR_ENV, INCLUDE_FUTURE_ENV, MEDIA_DIR_ENV, STAGING_DIR_ENV,
};
use podcast_common::VisibilityPolicy;
use std::path::{Path, PathBuf};

pub const DEEPGRAM_API_KEY_ENV: &str = "DEEPGRAM_API_KEY";
pub const UPLOAD_TOKEN_ENV: &str = "PODCAST_UPLOAD_TOKEN";

/// Values given on the command line; `None` means not given
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub content_dir: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,
    pub media_dir: Option<PathBuf>,
    pub include_future: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub content_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub media_dir: PathBuf,
    pub visibility: VisibilityPolicy,
    pub media: MediaConfig,
    pub show: ShowConfig,
    pub deepgram_api_key: Option<String>,
    pub deepgram_model: Option<String>,
    pub ollama_base_url: Option<String>,
    pub ollama_model: Option<String>,
    pub upload_endpoint: Option<String>,
    pub upload_bucket: Option<String>,
    pub upload_token: Option<String>,
}

impl Settings {
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Self {
        let content_dir = resolve_dir(
            cli.content_dir.as_deref(),
            CONTENT_DIR_ENV,
            toml.content_dir.as_deref(),
            || Some(default_content_dir()),
        )
        .unwrap_or_else(default_content_dir);

        // Staged transcripts and the media mirror default to the same folder,
        // which is how the batch transcriber lays them out
        let media_dir = resolve_dir(
            cli.media_dir.as_deref(),
            MEDIA_DIR_ENV,
            toml.media_dir.as_deref(),
            || None,
        )
        .unwrap_or_else(|| PathBuf::from("episodes"));

        let staging_dir = resolve_dir(
            cli.staging_dir.as_deref(),
            STAGING_DIR_ENV,
            toml.staging_dir.as_deref(),
            || None,
        )
        .unwrap_or_else(|| media_dir.clone());

        Self {
            content_dir,
            staging_dir,
            media_dir,
            visibility: resolve_visibility(cli.include_future, toml.include_future),
            media: toml.media.clone(),
            show: toml.show.clone(),
            deepgram_api_key: resolve_secret(
                DEEPGRAM_API_KEY_ENV,
                toml.deepgram.api_key.as_deref(),
            ),
            deepgram_model: toml.deepgram.model.clone(),
            ollama_base_url: toml.ollama.base_url.clone(),
            ollama_model: toml.ollama.model.clone(),
            upload_endpoint: toml.upload.endpoint.clone(),
            upload_bucket: toml.upload.bucket.clone(),
            upload_token: resolve_secret(UPLOAD_TOKEN_ENV, toml.upload.token.as_deref()),
        }
    }

    /// Settings rooted at explicit folders, with every other value defaulted
    pub fn for_dirs(content_dir: &Path, staging_dir: &Path, media_dir: &Path) -> Self {
        Self {
            content_dir: content_dir.to_path_buf(),
            staging_dir: staging_dir.to_path_buf(),
            media_dir: media_dir.to_path_buf(),
            visibility: VisibilityPolicy::default(),
            media: MediaConfig::default(),
            show: ShowConfig::default(),
            deepgram_api_key: None,
            deepgram_model: None,
            ollama_base_url: None,
            ollama_model: None,
            upload_endpoint: None,
            upload_bucket: None,
            upload_token: None,
        }
    }

    pub fn deepgram_client(&self) -> Result<DeepgramClient, AdapterError> {
        let api_key = self.deepgram_api_key.clone().ok_or_else(|| {
            AdapterError::NotConfigured(format!(
                "Deepgram API key (set {DEEPGRAM_API_KEY_ENV} or [deepgram] api_key)"
            ))
        })?;
        DeepgramClient::new(api_key, self.deepgram_model.clone())
    }

    pub fn ollama_client(&self) -> Result<OllamaClient, AdapterError> {
        OllamaClient::new(self.ollama_base_url.clone(), self.ollama_model.clone())
    }

    pub fn uploader(&self) -> Result<HttpUploader, AdapterError> {
        let endpoint = self
            .upload_endpoint
            .clone()
            .ok_or_else(|| AdapterError::NotConfigured("[upload] endpoint".to_string()))?;
        let bucket = self
            .upload_bucket
            .clone()
            .ok_or_else(|| AdapterError::NotConfigured("[upload] bucket".to_string()))?;
        let token = self.upload_token.clone().ok_or_else(|| {
            AdapterError::NotConfigured(format!(
                "upload token (set {UPLOAD_TOKEN_ENV} or [upload] token)"
            ))
        })?;
        HttpUploader::new(endpoint, bucket, token)
    }

    /// Public URL of a media file on the current host
    pub fn media_url(&self, media_filename: &str) -> String {
        format!("{}/{}", self.media.base_url.trim_end_matches('/'), media_filename)
    }
}

/// CLI flag wins when set; then the environment, then the config file
fn resolve_visibility(cli_flag: bool, toml_value: Option<bool>) -> VisibilityPolicy {
    if cli_flag {
        return VisibilityPolicy::include_future();
    }

    if let Ok(raw) = std::env::var(INCLUDE_FUTURE_ENV) {
        match parse_bool_flag(&raw) {
            Some(include_future) => return VisibilityPolicy { include_future },
            None => tracing::warn!("Ignoring unrecognized {}={:?}", INCLUDE_FUTURE_ENV, raw),
        }
    }

    VisibilityPolicy {
        include_future: toml_value.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cli_dirs_win() {
        let cli = CliOverrides {
            content_dir: Some(PathBuf::from("/cli/content")),
            staging_dir: None,
            media_dir: Some(PathBuf::from("/cli/media")),
            include_future: false,
        };
        let toml = TomlConfig {
            content_dir: Some(PathBuf::from("/toml/content")),
            ..TomlConfig::default()
        };
        std::env::remove_var(CONTENT_DIR_ENV);
        std::env::remove_var(STAGING_DIR_ENV);

        let settings = Settings::resolve(&cli, &toml);
        assert_eq!(settings.content_dir, PathBuf::from("/cli/content"));
        assert_eq!(settings.media_dir, PathBuf::from("/cli/media"));
        // Staging follows the media folder when unset
        assert_eq!(settings.staging_dir, PathBuf::from("/cli/media"));
    }

    #[test]
    #[serial]
    fn test_include_future_priority() {
        std::env::remove_var(INCLUDE_FUTURE_ENV);
        assert!(!resolve_visibility(false, None).include_future);
        assert!(resolve_visibility(false, Some(true)).include_future);

        std::env::set_var(INCLUDE_FUTURE_ENV, "false");
        assert!(!resolve_visibility(false, Some(true)).include_future);
        assert!(resolve_visibility(true, Some(false)).include_future);

        std::env::set_var(INCLUDE_FUTURE_ENV, "1");
        assert!(resolve_visibility(false, None).include_future);
        std::env::remove_var(INCLUDE_FUTURE_ENV);
    }

    #[test]
    fn test_media_url() {
        let mut settings = Settings::for_dirs(Path::new("c"), Path::new("s"), Path::new("m"));
        settings.media.base_url = "https://media.example.com/".to_string();
        assert_eq!(settings.media_url("043.mp3"), "https://media.example.com/043.mp3");
    }

    #[test]
    fn test_missing_credentials_are_not_configured() {
        let settings = Settings::for_dirs(Path::new("c"), Path::new("s"), Path::new("m"));
        assert!(matches!(settings.deepgram_client(), Err(AdapterError::NotConfigured(_))));
        assert!(matches!(settings.uploader(), Err(AdapterError::NotConfigured(_))));
    }
}
