//! External service adapters
//!
//! Reconciliation depends on three outside services: speech-to-text,
//! text generation and object storage. Each is a trait here with one HTTP
//! implementation, so operations and tests can swap in their own.

pub mod analysis;
pub mod deepgram;
pub mod format;
pub mod ollama;
pub mod rate_limit;
pub mod uploader;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use analysis::{analyze_transcript, TranscriptAnalysis};
pub use deepgram::DeepgramClient;
pub use format::format_transcript;
pub use ollama::OllamaClient;
pub use rate_limit::RateLimiter;
pub use uploader::HttpUploader;

/// Adapter errors
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider refused for lack of credits or quota
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Required credential or endpoint missing from configuration
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One speaker turn
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub speaker: u32,
    pub start_seconds: f64,
    pub text: String,
}

/// Diarized transcription of one media file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcription {
    pub utterances: Vec<Utterance>,
    pub duration_seconds: f64,
}

impl Transcription {
    pub fn speaker_count(&self) -> usize {
        let mut speakers: Vec<u32> = self.utterances.iter().map(|u| u.speaker).collect();
        speakers.sort_unstable();
        speakers.dedup();
        speakers.len()
    }
}

/// Speech-to-text provider
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<Transcription, AdapterError>;
}

/// Text generation provider
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AdapterError>;

    /// True when the provider is reachable
    async fn health_check(&self) -> bool {
        true
    }
}

/// Object storage upload
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload a local file under `key`; returns the stored object's URL
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String, AdapterError>;
}

/// Quota and credit exhaustion is reported either by status or in the body
pub(crate) fn is_quota_message(status: u16, body: &str) -> bool {
    if status == 402 {
        return true;
    }
    let lowered = body.to_ascii_lowercase();
    lowered.contains("credits") || lowered.contains("quota")
}
