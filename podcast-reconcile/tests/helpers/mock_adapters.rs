//! In-process stand-ins for the transcription and text generation services

use async_trait::async_trait;
use podcast_reconcile::adapters::{AdapterError, Summarizer, Transcriber, Transcription, Utterance};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transcriber returning a fixed conversation, optionally running out of
/// credit after a number of calls
#[derive(Default)]
pub struct ScriptedTranscriber {
    pub calls: AtomicUsize,
    pub quota_after: Option<usize>,
}

impl ScriptedTranscriber {
    pub fn with_quota(calls: usize) -> Self {
        Self {
            quota_after: Some(calls),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(
        &self,
        _audio: Vec<u8>,
        _mime_type: &str,
    ) -> Result<Transcription, AdapterError> {
        let made = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.quota_after.is_some_and(|limit| made >= limit) {
            return Err(AdapterError::QuotaExhausted("insufficient credits".to_string()));
        }
        Ok(Transcription {
            utterances: vec![
                Utterance {
                    speaker: 0,
                    start_seconds: 0.0,
                    text: "Welcome to the show.".to_string(),
                },
                Utterance {
                    speaker: 1,
                    start_seconds: 65.4,
                    text: "Glad to be here.".to_string(),
                },
            ],
            duration_seconds: 3725.0,
        })
    }
}

/// Summarizer answering every prompt with the same labelled reply
pub struct CannedSummarizer {
    pub reply: String,
    pub healthy: bool,
    pub calls: AtomicUsize,
}

impl CannedSummarizer {
    pub fn new() -> Self {
        Self {
            reply: "SUMMARY: Stan and Jon talk about citrus.\n\
                    KEYWORDS: lemons, limes, podcasting, citrus, archives, tidiness"
                .to_string(),
            healthy: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for CannedSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for CannedSummarizer {
    async fn generate(&self, _prompt: &str) -> Result<String, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}
