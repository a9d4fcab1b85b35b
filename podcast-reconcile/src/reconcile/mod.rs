//! Reconciliation operations
//!
//! Every operation follows the same scan-compute-act shape: pick a scan set
//! from the store index, decide one outcome per item, then act on it. A dry
//! run makes the same decisions and emits the same log lines, but never
//! touches the filesystem or an external service.

pub mod attach_metadata;
pub mod backfill_summaries;
pub mod copy_transcripts;
pub mod excerpt_summaries;
pub mod refresh_enclosures;
pub mod rename_transcripts;
pub mod rewrite_hosts;
pub mod summary;
pub mod transcribe_staged;

pub use attach_metadata::AttachMetadata;
pub use backfill_summaries::BackfillSummaries;
pub use copy_transcripts::CopyTranscripts;
pub use excerpt_summaries::ExcerptSummaries;
pub use refresh_enclosures::RefreshEnclosures;
pub use rename_transcripts::RenameTranscripts;
pub use rewrite_hosts::RewriteHosts;
pub use summary::RunSummary;
pub use transcribe_staged::TranscribeStaged;

use crate::config::Settings;
use crate::error::{ReconcileError, ReconcileResult};
use crate::store::StoreIndex;
use async_trait::async_trait;
use podcast_common::Document;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Decision for one scanned item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Changed (or, in a dry run, would change) the store
    Acted(String),
    /// Not applicable, or already converged
    Skipped(String),
    /// An expected dependency is absent; nothing to do yet
    Missing(String),
}

/// Everything an operation may read during a run
pub struct RunContext<'a> {
    pub settings: &'a Settings,
    pub index: &'a StoreIndex,
    pub dry_run: bool,
    claims: Mutex<HashSet<PathBuf>>,
}

impl<'a> RunContext<'a> {
    pub fn new(settings: &'a Settings, index: &'a StoreIndex, dry_run: bool) -> Self {
        Self {
            settings,
            index,
            dry_run,
            claims: Mutex::new(HashSet::new()),
        }
    }

    /// Reserve a destination path for this run
    ///
    /// Fails when another item already claimed it, or when a file is already
    /// there. Claims are checked before the disk so a dry run, which writes
    /// nothing, reaches the same decision as a real one.
    pub fn claim_destination(&self, destination: &Path) -> ReconcileResult<()> {
        let mut claims = self
            .claims
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if claims.contains(destination) || destination.exists() {
            return Err(ReconcileError::KeyCollision(destination.to_path_buf()));
        }
        claims.insert(destination.to_path_buf());
        Ok(())
    }

    /// True when a destination was claimed earlier in this run
    pub fn is_claimed(&self, destination: &Path) -> bool {
        self.claims
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(destination)
    }

    /// Write a document back unless this is a dry run
    pub fn write_document(&self, document: &Document, path: &Path) -> ReconcileResult<()> {
        if !self.dry_run {
            document.write(path)?;
        }
        Ok(())
    }
}

/// One reconciliation step
#[async_trait]
pub trait Operation: Send + Sync {
    /// Name used in logs and the summary
    fn name(&self) -> &'static str;

    /// Items this operation considers, in processing order
    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>>;

    /// Decide and act on one item
    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome>;
}

/// Run one operation over its whole scan set
///
/// Per-item errors are logged and counted; only a fatal error stops the
/// batch early. Failing to produce the scan set at all is returned to the
/// caller.
pub async fn run_batch(
    operation: &dyn Operation,
    ctx: &RunContext<'_>,
) -> ReconcileResult<RunSummary> {
    let items = operation.scan(ctx)?;
    let mut summary = RunSummary::new(operation.name(), items.len(), ctx.dry_run);

    info!(
        operation = operation.name(),
        items = items.len(),
        dry_run = ctx.dry_run,
        "Starting batch"
    );

    for (position, item) in items.iter().enumerate() {
        match operation.apply(item, ctx).await {
            Ok(Outcome::Acted(message)) => {
                info!(path = %item.display(), dry_run = ctx.dry_run, "{}", message);
                summary.acted += 1;
            }
            Ok(Outcome::Skipped(reason)) => {
                tracing::debug!(path = %item.display(), "Skipped: {}", reason);
                summary.skipped += 1;
            }
            Ok(Outcome::Missing(reason)) => {
                warn!(path = %item.display(), "Missing: {}", reason);
                summary.missing += 1;
            }
            Err(e) if e.is_fatal() => {
                error!(path = %item.display(), "Aborting batch: {}", e);
                summary.errored += 1;
                summary.not_processed = items.len() - position - 1;
                summary.aborted = Some(e.to_string());
                break;
            }
            Err(e) => {
                error!(path = %item.display(), "{}", e);
                summary.errored += 1;
            }
        }
    }

    info!(
        operation = operation.name(),
        acted = summary.acted,
        skipped = summary.skipped,
        missing = summary.missing,
        errored = summary.errored,
        "Batch complete"
    );

    Ok(summary)
}

/// Index entry for a scanned path
pub(crate) fn entry_for<'a>(
    ctx: &RunContext<'a>,
    path: &Path,
) -> ReconcileResult<&'a crate::store::IndexEntry> {
    ctx.index.get(path).ok_or_else(|| ReconcileError::Unreadable {
        path: path.to_path_buf(),
        reason: "not in the store index".to_string(),
    })
}

/// File name of a path for log messages
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
