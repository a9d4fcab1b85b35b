//! Move enclosure URLs off retired media hosts

use super::{entry_for, Operation, Outcome, RunContext};
use crate::error::{ReconcileError, ReconcileResult};
use async_trait::async_trait;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

pub struct RewriteHosts;

#[async_trait]
impl Operation for RewriteHosts {
    fn name(&self) -> &'static str {
        "rewrite-hosts"
    }

    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>> {
        Ok(ctx.index.records().map(|e| e.path.clone()).collect())
    }

    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome> {
        let entry = entry_for(ctx, item)?;
        let (document, post) = entry.require_record()?;

        let Some(url) = post.enclosure_url() else {
            return Ok(Outcome::Skipped("no enclosure".to_string()));
        };

        let media = &ctx.settings.media;
        let Some(rewritten) = rewrite_url(url, &media.legacy_prefixes, &media.base_url) else {
            return Ok(Outcome::Skipped("not on a legacy host".to_string()));
        };

        let mut updated = document.clone();
        let Some(mapping) = updated.get_mapping_mut("enclosure") else {
            return Err(ReconcileError::MissingEnclosure(item.to_path_buf()));
        };
        mapping.insert(Value::from("url"), Value::from(rewritten.as_str()));

        ctx.write_document(&updated, item)?;

        Ok(Outcome::Acted(format!("Rewrote {} to {}", url, rewritten)))
    }
}

/// New URL for one on a legacy host; the path after the prefix is kept verbatim
pub fn rewrite_url(url: &str, legacy_prefixes: &[String], base_url: &str) -> Option<String> {
    let remainder = legacy_prefixes
        .iter()
        .filter(|prefix| !prefix.is_empty())
        .find_map(|prefix| url.strip_prefix(prefix.as_str()))?;

    let rewritten = format!("{}/{}", base_url.trim_end_matches('/'), remainder);
    (rewritten != url).then_some(rewritten)
}
