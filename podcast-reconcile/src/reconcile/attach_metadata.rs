//! Attach post metadata to bare transcripts
//!
//! A freshly copied transcript is just speaker blocks. It takes its title,
//! episode, date and slug from the single post sharing its directory, and
//! gains the `type: transcript` marker that makes it addressable by owner
//! key from then on.

use super::{display_name, entry_for, Operation, Outcome, RunContext};
use crate::error::{ReconcileError, ReconcileResult};
use async_trait::async_trait;
use podcast_common::records::{transcript_slug, TRANSCRIPT_TYPE};
use std::path::{Path, PathBuf};

pub struct AttachMetadata;

#[async_trait]
impl Operation for AttachMetadata {
    fn name(&self) -> &'static str {
        "attach-metadata"
    }

    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>> {
        Ok(ctx.index.transcripts().map(|e| e.path.clone()).collect())
    }

    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome> {
        let entry = entry_for(ctx, item)?;
        let (document, artifact) = entry.require_transcript()?;

        if artifact.attached {
            return Ok(Outcome::Skipped("already attached".to_string()));
        }

        let dir = entry.directory();
        let siblings = ctx.index.records_in_dir(dir);
        let sibling = match siblings.as_slice() {
            [] => return Err(ReconcileError::NoSiblingRecord(dir.to_path_buf())),
            [only] => *only,
            many => {
                return Err(ReconcileError::AmbiguousSibling {
                    dir: dir.to_path_buf(),
                    count: many.len(),
                })
            }
        };
        let (post_document, post) = sibling.require_record()?;

        let mut updated = document.clone();
        updated.set("title", post.title.as_str());
        if let Some(episode) = post.episode {
            updated.set("episode", episode);
        }
        // Keep the post's date exactly as its author wrote it
        if let Some(date) = post_document.get("date") {
            updated.set("date", date.clone());
        }
        if let Some(slug) = &post.slug {
            updated.set("slug", transcript_slug(slug));
        }
        updated.set("type", TRANSCRIPT_TYPE);

        ctx.write_document(&updated, item)?;

        Ok(Outcome::Acted(format!(
            "Attached metadata from {} (episode {})",
            display_name(&sibling.path),
            post.episode.map(|e| e.to_string()).unwrap_or_else(|| "?".to_string())
        )))
    }
}
