//! Error types for podcast-reconcile
//!
//! Per-record failures are reported by the batch runner and never stop a
//! batch, with one exception: a provider that has run out of quota or
//! credits aborts the run, since every later call would fail the same way.

use crate::adapters::AdapterError;
use podcast_common::records::OwnerKey;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Front matter could not be parsed, or a post lacks its title or date
    #[error("Unreadable document {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// Transcript directory holds no post to take metadata from
    #[error("No post found next to transcript in {0}")]
    NoSiblingRecord(PathBuf),

    /// More than one post shares the transcript's directory
    #[error("Ambiguous post for transcript in {dir}: {count} candidates")]
    AmbiguousSibling { dir: PathBuf, count: usize },

    /// No post carries the transcript's episode and slug
    #[error("No post matches transcript owner {}", describe_owner(.0))]
    NoMatchingOwner(OwnerKey),

    /// Several posts carry the transcript's episode and slug
    #[error("Ambiguous owner {}: {count} posts match", describe_owner(.key))]
    AmbiguousOwner { key: OwnerKey, count: usize },

    /// Owning post has no enclosure URL
    #[error("Post {0} has no enclosure URL")]
    MissingEnclosure(PathBuf),

    /// Enclosure URL has no trailing file name
    #[error("Enclosure URL has no media file name: {0}")]
    UnusableMediaUrl(String),

    /// Media file missing from the local mirror
    #[error("Media file not found: {0}")]
    MediaNotFound(PathBuf),

    /// Destination already holds a different file, or was claimed earlier in this run
    #[error("Destination already taken: {0}")]
    KeyCollision(PathBuf),

    /// Body has no paragraph usable as an excerpt
    #[error("No usable paragraph for an excerpt in {0}")]
    NoExcerpt(PathBuf),

    /// Refused to overwrite an existing file
    #[error("File already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Invalid command input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] podcast_common::Error),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl ReconcileError {
    /// True when the whole batch must stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReconcileError::Adapter(AdapterError::QuotaExhausted(_)))
    }
}

fn describe_owner(key: &OwnerKey) -> String {
    let episode = key
        .episode
        .map(|e| e.to_string())
        .unwrap_or_else(|| "-".to_string());
    let slug = key.slug.as_deref().unwrap_or("-");
    format!("(episode {episode}, slug {slug})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_quota_exhaustion_is_fatal() {
        let quota = ReconcileError::Adapter(AdapterError::QuotaExhausted("402".into()));
        assert!(quota.is_fatal());

        let api = ReconcileError::Adapter(AdapterError::Api(500, "boom".into()));
        assert!(!api.is_fatal());
        assert!(!ReconcileError::NoExcerpt(PathBuf::from("a.md")).is_fatal());
    }

    #[test]
    fn test_owner_in_message() {
        let err = ReconcileError::NoMatchingOwner(OwnerKey {
            episode: Some(43),
            slug: None,
        });
        assert_eq!(
            err.to_string(),
            "No post matches transcript owner (episode 43, slug -)"
        );
    }
}
