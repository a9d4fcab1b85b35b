//! Rename attached transcripts to their canonical key
//!
//! The canonical key is the owner's media file name with the document
//! extension, so a transcript can always be found from the enclosure URL
//! alone.

use super::{display_name, entry_for, Operation, Outcome, RunContext};
use crate::error::{ReconcileError, ReconcileResult};
use crate::store::IndexEntry;
use async_trait::async_trait;
use podcast_common::media_key::{canonical_transcript_key, extract_media_filename};
use podcast_common::records::OwnerKey;
use std::path::{Path, PathBuf};

pub struct RenameTranscripts;

#[async_trait]
impl Operation for RenameTranscripts {
    fn name(&self) -> &'static str {
        "rename-transcripts"
    }

    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>> {
        Ok(ctx.index.transcripts().map(|e| e.path.clone()).collect())
    }

    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome> {
        let entry = entry_for(ctx, item)?;
        let (_, artifact) = entry.require_transcript()?;

        if !artifact.attached {
            return Ok(Outcome::Skipped("not attached to a post yet".to_string()));
        }

        let key = artifact.owner_key();
        let owner = resolve_owner(ctx, &key, entry.directory())?;
        let (_, post) = owner.require_record()?;

        let url = post
            .enclosure_url()
            .ok_or_else(|| ReconcileError::MissingEnclosure(owner.path.clone()))?;
        let media_filename = extract_media_filename(Some(url))
            .ok_or_else(|| ReconcileError::UnusableMediaUrl(url.to_string()))?;
        let canonical = canonical_transcript_key(&media_filename);

        if artifact.storage_key == canonical {
            return Ok(Outcome::Skipped("already canonical".to_string()));
        }

        let destination = entry.directory().join(&canonical);
        ctx.claim_destination(&destination)?;

        if !ctx.dry_run {
            std::fs::rename(item, &destination)?;
        }

        Ok(Outcome::Acted(format!(
            "Renamed {} to {}",
            artifact.storage_key, canonical
        )))
    }
}

/// The single post whose `(episode, slug)` equals `key`
///
/// Candidates in the transcript's own directory win over ones elsewhere.
fn resolve_owner<'a>(
    ctx: &RunContext<'a>,
    key: &OwnerKey,
    transcript_dir: &Path,
) -> ReconcileResult<&'a IndexEntry> {
    if key.is_empty() {
        return Err(ReconcileError::NoMatchingOwner(key.clone()));
    }

    let candidates = ctx.index.records_owned_by(key);
    let local: Vec<&IndexEntry> = candidates
        .iter()
        .copied()
        .filter(|e| e.directory() == transcript_dir)
        .collect();
    let pool = if local.is_empty() { candidates } else { local };

    match pool.as_slice() {
        [] => Err(ReconcileError::NoMatchingOwner(key.clone())),
        [only] => {
            tracing::trace!(owner = %display_name(&only.path), "Resolved transcript owner");
            Ok(*only)
        }
        many => Err(ReconcileError::AmbiguousOwner {
            key: key.clone(),
            count: many.len(),
        }),
    }
}
