//! Transcribe numbered media files into the staging folder
//!
//! Output is named after the media file (`043-show.mp3` becomes
//! `043-show.md`), which is what transcript copying looks for.

use super::{display_name, Operation, Outcome, RunContext};
use crate::adapters::{format_transcript, Transcriber};
use crate::error::{ReconcileError, ReconcileResult};
use crate::media::detect_mime_type;
use async_trait::async_trait;
use podcast_common::document::write_atomic;
use podcast_common::media_key::canonical_transcript_key;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MEDIA_EXTENSION: &str = "mp3";

pub struct TranscribeStaged {
    transcriber: Arc<dyn Transcriber>,
    from_episode: i64,
}

impl TranscribeStaged {
    pub fn new(transcriber: Arc<dyn Transcriber>, from_episode: i64) -> Self {
        Self {
            transcriber,
            from_episode,
        }
    }
}

#[async_trait]
impl Operation for TranscribeStaged {
    fn name(&self) -> &'static str {
        "transcribe-staged"
    }

    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>> {
        let media_dir = &ctx.settings.media_dir;
        crate::store::scan_numbered_media(media_dir, MEDIA_EXTENSION, self.from_episode)
            .map_err(|e| ReconcileError::Scan(e.to_string()))
    }

    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome> {
        let media_filename = display_name(item);
        let output = ctx
            .settings
            .staging_dir
            .join(canonical_transcript_key(&media_filename));

        if output.exists() {
            return Ok(Outcome::Skipped("already transcribed".to_string()));
        }

        if ctx.dry_run {
            return Ok(Outcome::Acted(format!("Would transcribe {}", media_filename)));
        }

        let audio = tokio::fs::read(item).await?;
        let mime_type = detect_mime_type(item).unwrap_or("audio/mpeg");
        let transcription = self.transcriber.transcribe(audio, mime_type).await?;

        let markdown = format_transcript(&transcription.utterances);
        tokio::fs::create_dir_all(&ctx.settings.staging_dir).await?;
        write_atomic(&output, markdown.as_bytes())?;

        Ok(Outcome::Acted(format!(
            "Transcribed {}: {} utterances, {} speakers",
            media_filename,
            transcription.utterances.len(),
            transcription.speaker_count()
        )))
    }
}
