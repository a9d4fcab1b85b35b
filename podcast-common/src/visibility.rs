//! Publish-date visibility
//!
//! Content is authored ahead of release. Public collections only include
//! records whose publish instant has passed, unless a preview build asks for
//! future records too.

use crate::records::ContentRecord;
use chrono::{DateTime, Utc};

/// Whether future-dated records are eligible for public collections
///
/// The flag is resolved once by the caller (CLI flag, environment, config
/// file) and passed in; nothing here reads process state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityPolicy {
    pub include_future: bool,
}

impl VisibilityPolicy {
    /// Only records published at or before `now`
    pub fn published_only() -> Self {
        Self {
            include_future: false,
        }
    }

    /// Every record, regardless of publish date (preview builds)
    pub fn include_future() -> Self {
        Self {
            include_future: true,
        }
    }

    /// Full-resolution comparison: a record published later today stays
    /// hidden until its exact instant
    pub fn is_visible(&self, record: &ContentRecord, now: DateTime<Utc>) -> bool {
        self.include_future || record.publish_date <= now
    }
}
