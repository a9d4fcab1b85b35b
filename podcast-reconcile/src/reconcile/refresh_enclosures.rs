//! Refresh enclosure length and type from the local media mirror

use super::{entry_for, Operation, Outcome, RunContext};
use crate::error::{ReconcileError, ReconcileResult};
use crate::media::probe_media;
use async_trait::async_trait;
use podcast_common::media_key::extract_media_filename;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

pub struct RefreshEnclosures;

#[async_trait]
impl Operation for RefreshEnclosures {
    fn name(&self) -> &'static str {
        "refresh-enclosures"
    }

    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>> {
        Ok(ctx.index.records().map(|e| e.path.clone()).collect())
    }

    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome> {
        let entry = entry_for(ctx, item)?;
        let (document, post) = entry.require_record()?;

        let Some(enclosure) = &post.enclosure else {
            return Ok(Outcome::Skipped("no enclosure".to_string()));
        };
        let media_filename = extract_media_filename(Some(&enclosure.url))
            .ok_or_else(|| ReconcileError::UnusableMediaUrl(enclosure.url.clone()))?;

        let local = ctx.settings.media_dir.join(&media_filename);
        if !local.is_file() {
            return Err(ReconcileError::MediaNotFound(local));
        }
        let facts = probe_media(&local)?;

        let length_changed = enclosure.length_bytes != Some(facts.length_bytes);
        let observed_type = facts.mime_type.map(str::to_string);
        let type_changed = observed_type.is_some() && enclosure.mime_type != observed_type;

        if !length_changed && !type_changed {
            return Ok(Outcome::Skipped("enclosure up to date".to_string()));
        }

        let mut updated = document.clone();
        let Some(mapping) = updated.get_mapping_mut("enclosure") else {
            return Err(ReconcileError::MissingEnclosure(item.to_path_buf()));
        };
        mapping.insert(Value::from("length"), Value::from(facts.length_bytes));
        if let Some(mime_type) = facts.mime_type {
            mapping.insert(Value::from("type"), Value::from(mime_type));
        }

        ctx.write_document(&updated, item)?;

        Ok(Outcome::Acted(format!(
            "Updated enclosure of {}: {} bytes, {}",
            media_filename,
            facts.length_bytes,
            facts.mime_type.unwrap_or("type unchanged")
        )))
    }
}
