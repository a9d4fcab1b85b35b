//! Copy staged transcripts next to their posts
//!
//! Transcripts are produced outside the content store, named after the
//! media file. Each post with an enclosure gets a copy of its staged
//! transcript under the working name, ready for metadata attachment.

use super::{entry_for, Operation, Outcome, RunContext};
use crate::error::{ReconcileError, ReconcileResult};
use async_trait::async_trait;
use podcast_common::media_key::{canonical_transcript_key, extract_media_filename};
use podcast_common::records::{OwnerKey, TRANSCRIPT_WORKING_NAME};
use podcast_common::ContentRecord;
use std::path::{Path, PathBuf};

pub struct CopyTranscripts;

#[async_trait]
impl Operation for CopyTranscripts {
    fn name(&self) -> &'static str {
        "copy-transcripts"
    }

    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>> {
        Ok(ctx.index.records().map(|e| e.path.clone()).collect())
    }

    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome> {
        let entry = entry_for(ctx, item)?;
        let (_, post) = entry.require_record()?;

        let Some(url) = post.enclosure_url() else {
            return Ok(Outcome::Skipped("no enclosure".to_string()));
        };
        let media_filename = extract_media_filename(Some(url))
            .ok_or_else(|| ReconcileError::UnusableMediaUrl(url.to_string()))?;
        let canonical = canonical_transcript_key(&media_filename);

        let dir = entry.directory();
        let destination = dir.join(TRANSCRIPT_WORKING_NAME);

        // Another post in this directory already took the working name
        if ctx.is_claimed(&destination) {
            return Err(ReconcileError::KeyCollision(destination));
        }

        if let Some(existing) = existing_transcript(ctx, post, dir, &canonical)? {
            return Ok(Outcome::Skipped(format!(
                "transcript present at {}",
                existing.display()
            )));
        }

        let staged = ctx.settings.staging_dir.join(&canonical);
        if !staged.is_file() {
            return Ok(Outcome::Missing(format!(
                "no staged transcript {}",
                staged.display()
            )));
        }

        ctx.claim_destination(&destination)?;
        if !ctx.dry_run {
            std::fs::copy(&staged, &destination)?;
        }

        Ok(Outcome::Acted(format!(
            "Copied {} to {}",
            canonical,
            destination.display()
        )))
    }
}

/// Any transcript that already serves this post
///
/// A working file shared by several enclosure posts belongs to whichever
/// one it names as owner or was copied from; the others collide with it.
fn existing_transcript(
    ctx: &RunContext<'_>,
    post: &ContentRecord,
    dir: &Path,
    canonical: &str,
) -> ReconcileResult<Option<PathBuf>> {
    let key = post.owner_key();

    let working = dir.join(TRANSCRIPT_WORKING_NAME);
    if working.exists() {
        if working_serves(ctx, &key, dir, &working, canonical) {
            return Ok(Some(working));
        }
        return Err(ReconcileError::KeyCollision(working));
    }

    let keyed = dir.join(canonical);
    if keyed.exists() {
        return Ok(Some(keyed));
    }

    if key.is_empty() {
        return Ok(None);
    }
    Ok(ctx
        .index
        .transcripts_owned_by(&key)
        .first()
        .map(|e| e.path.clone()))
}

fn working_serves(
    ctx: &RunContext<'_>,
    key: &OwnerKey,
    dir: &Path,
    working: &Path,
    canonical: &str,
) -> bool {
    let owned = ctx
        .index
        .get(working)
        .and_then(|e| e.transcript())
        .is_some_and(|t| t.attached && !key.is_empty() && t.owner_key() == *key);
    if owned {
        return true;
    }

    let enclosure_posts = ctx
        .index
        .records_in_dir(dir)
        .iter()
        .filter(|e| e.record().is_some_and(|r| r.enclosure_url().is_some()))
        .count();
    if enclosure_posts == 1 {
        return true;
    }

    // Shared directory: only a byte-for-byte copy of this post's staged file
    let staged = ctx.settings.staging_dir.join(canonical);
    match (std::fs::read(working), std::fs::read(&staged)) {
        (Ok(current), Ok(expected)) => current == expected,
        _ => false,
    }
}
