//! Backfill transcript summaries and keywords with a text generation model

use super::{entry_for, Operation, Outcome, RunContext};
use crate::adapters::{analyze_transcript, Summarizer};
use crate::error::ReconcileResult;
use async_trait::async_trait;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct BackfillSummaries {
    summarizer: Arc<dyn Summarizer>,
}

impl BackfillSummaries {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }
}

#[async_trait]
impl Operation for BackfillSummaries {
    fn name(&self) -> &'static str {
        "backfill-summaries"
    }

    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>> {
        Ok(ctx.index.transcripts().map(|e| e.path.clone()).collect())
    }

    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome> {
        let entry = entry_for(ctx, item)?;
        let (document, artifact) = entry.require_transcript()?;

        if !artifact.attached {
            return Ok(Outcome::Skipped("not attached to a post yet".to_string()));
        }
        if artifact.summary.is_some() && !artifact.keywords.is_empty() {
            return Ok(Outcome::Skipped("already summarized".to_string()));
        }

        let title = artifact
            .title
            .clone()
            .unwrap_or_else(|| artifact.storage_key.clone());

        if ctx.dry_run {
            return Ok(Outcome::Acted(format!("Would summarize \"{}\"", title)));
        }

        let analysis =
            analyze_transcript(self.summarizer.as_ref(), &ctx.settings.show, &title, &artifact.body)
                .await?;

        let mut updated = document.clone();
        updated.set("summary", analysis.summary.as_str());
        updated.set(
            "keywords",
            Value::Sequence(analysis.keywords.iter().map(|k| Value::from(k.as_str())).collect()),
        );
        ctx.write_document(&updated, item)?;

        Ok(Outcome::Acted(format!(
            "Summarized \"{}\" ({} keywords)",
            title,
            analysis.keywords.len()
        )))
    }
}
