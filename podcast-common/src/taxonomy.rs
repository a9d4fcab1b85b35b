//! Taxonomy collections
//!
//! Categories and tags are hand typed, so the same entry shows up as `Tech`,
//! `tech` and `TECH`. Buckets are keyed by the normalized slug; the display
//! name is whatever spelling was seen first and never changes within a build.
//! Collections are rebuilt from the visible records on every request.

use crate::records::{ContentRecord, TranscriptArtifact};
use crate::slug::normalize;
use crate::visibility::VisibilityPolicy;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Which record field a collection is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyField {
    Categories,
    Tags,
}

impl TaxonomyField {
    pub fn values(self, record: &ContentRecord) -> &[String] {
        match self {
            TaxonomyField::Categories => &record.categories,
            TaxonomyField::Tags => &record.tags,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaxonomyField::Categories => "categories",
            TaxonomyField::Tags => "tags",
        }
    }
}

/// One category or tag with its member records
#[derive(Debug, Clone)]
pub struct TaxonomyBucket<'a> {
    /// Normalized key
    pub key: String,
    /// First-seen spelling
    pub display_name: String,
    /// Newest publish date first; ties keep input order
    pub members: Vec<&'a ContentRecord>,
}

/// Build the category or tag collection over visible records
pub fn build_collection<'a>(
    records: &'a [ContentRecord],
    field: TaxonomyField,
    policy: VisibilityPolicy,
    now: DateTime<Utc>,
) -> BTreeMap<String, TaxonomyBucket<'a>> {
    let mut collection: BTreeMap<String, TaxonomyBucket<'a>> = BTreeMap::new();

    for record in records.iter().filter(|r| policy.is_visible(r, now)) {
        for value in field.values(record) {
            let key = normalize(value);
            let bucket = collection
                .entry(key.clone())
                .or_insert_with(|| TaxonomyBucket {
                    key,
                    display_name: value.clone(),
                    members: Vec::new(),
                });

            // Records are folded one at a time, so a repeat within the same
            // record can only be the latest member
            let already_member = bucket
                .members
                .last()
                .is_some_and(|last| std::ptr::eq(*last, record));
            if !already_member {
                bucket.members.push(record);
            }
        }
    }

    for bucket in collection.values_mut() {
        bucket
            .members
            .sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
    }

    tracing::debug!(
        field = field.label(),
        buckets = collection.len(),
        "Built taxonomy collection"
    );

    collection
}

/// Visible records, newest first
pub fn build_blog_collection(
    records: &[ContentRecord],
    policy: VisibilityPolicy,
    now: DateTime<Utc>,
) -> Vec<&ContentRecord> {
    let mut blog: Vec<&ContentRecord> = records
        .iter()
        .filter(|r| policy.is_visible(r, now))
        .collect();
    blog.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
    blog
}

/// Transcripts ordered by episode number; unnumbered ones sort as episode 0
pub fn build_transcript_collection(transcripts: &[TranscriptArtifact]) -> Vec<&TranscriptArtifact> {
    let mut ordered: Vec<&TranscriptArtifact> = transcripts.iter().collect();
    ordered.sort_by_key(|t| t.owner_episode.unwrap_or(0));
    ordered
}

/// Raw usage count for one display spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyEntry {
    pub value: String,
    pub count: usize,
}

/// Count every spelling as written, across all records
///
/// No normalization and no visibility filter, so capitalization variants
/// that would merge into one bucket are listed separately. Sorted
/// case-insensitively.
pub fn tally(records: &[ContentRecord], field: TaxonomyField) -> Vec<TallyEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for value in field.values(record) {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<TallyEntry> = counts
        .into_iter()
        .map(|(value, count)| TallyEntry {
            value: value.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| {
        a.value
            .to_lowercase()
            .cmp(&b.value.to_lowercase())
            .then_with(|| a.value.cmp(&b.value))
    });
    entries
}
