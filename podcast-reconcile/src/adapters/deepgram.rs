//! Deepgram prerecorded transcription client
//!
//! Uploads the raw media bytes and asks for speaker diarization and
//! utterance segmentation; only the utterance list and total duration are
//! kept from the response.

use super::{is_quota_message, AdapterError, RateLimiter, Transcriber, Transcription, Utterance};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com/v1/listen";
const DEFAULT_MODEL: &str = "nova-3";
const USER_AGENT: &str = concat!("podcast-reconcile/", env!("CARGO_PKG_VERSION"));
const RATE_LIMIT_MS: u64 = 1000;
/// Hour-long episodes take minutes to process
const REQUEST_TIMEOUT_SECS: u64 = 900;

#[derive(Debug, Deserialize)]
struct ListenResponse {
    #[serde(default)]
    metadata: Option<ListenMetadata>,
    #[serde(default)]
    results: Option<ListenResults>,
}

#[derive(Debug, Deserialize)]
struct ListenMetadata {
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    #[serde(default)]
    utterances: Vec<ListenUtterance>,
}

#[derive(Debug, Deserialize)]
struct ListenUtterance {
    #[serde(default)]
    speaker: u32,
    start: f64,
    transcript: String,
}

/// Deepgram API client
pub struct DeepgramClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    api_key: String,
    model: String,
    base_url: String,
}

impl DeepgramClient {
    pub fn new(api_key: String, model: Option<String>) -> Result<Self, AdapterError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AdapterError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: DEEPGRAM_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Transcriber for DeepgramClient {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<Transcription, AdapterError> {
        self.rate_limiter.wait().await;

        let params = [
            ("model", self.model.as_str()),
            ("language", "en"),
            ("smart_format", "true"),
            ("paragraphs", "true"),
            ("utterances", "true"),
            ("diarize", "true"),
        ];

        tracing::debug!(bytes = audio.len(), model = %self.model, "Submitting audio to Deepgram");

        let response = self
            .http_client
            .post(&self.base_url)
            .query(&params)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.api_key))
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(audio)
            .send()
            .await
            .map_err(|e| AdapterError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if is_quota_message(status.as_u16(), &error_text) {
                return Err(AdapterError::QuotaExhausted(format!(
                    "Deepgram {}: {}",
                    status.as_u16(),
                    error_text
                )));
            }
            return Err(AdapterError::Api(status.as_u16(), error_text));
        }

        let parsed: ListenResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        let transcription = into_transcription(parsed);

        tracing::info!(
            utterances = transcription.utterances.len(),
            speakers = transcription.speaker_count(),
            duration_seconds = transcription.duration_seconds,
            "Deepgram transcription complete"
        );

        Ok(transcription)
    }
}

fn into_transcription(response: ListenResponse) -> Transcription {
    let utterances = response
        .results
        .map(|r| r.utterances)
        .unwrap_or_default()
        .into_iter()
        .map(|u| Utterance {
            speaker: u.speaker,
            start_seconds: u.start,
            text: u.transcript,
        })
        .collect();

    Transcription {
        utterances,
        duration_seconds: response.metadata.map(|m| m.duration).unwrap_or(0.0),
    }
}
