//! Archive and taxonomy listings

use chrono::{DateTime, Utc};
use podcast_common::taxonomy::{
    build_blog_collection, build_collection, build_transcript_collection, tally, TaxonomyField,
};
use podcast_common::{ContentRecord, TranscriptArtifact, VisibilityPolicy};
use std::fmt::Write;

/// Newest posts shown in the archive listing
const RECENT_POSTS: usize = 5;

/// Visible post count with the newest few, then transcripts by episode
pub fn render_archive(
    records: &[ContentRecord],
    transcripts: &[TranscriptArtifact],
    policy: VisibilityPolicy,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    let blog = build_blog_collection(records, policy, now);
    let _ = writeln!(out, "POSTS ({} visible of {})", blog.len(), records.len());
    for record in blog.iter().take(RECENT_POSTS) {
        let _ = writeln!(out, "  {} {}", record.publish_date.format("%Y-%m-%d"), record.title);
    }
    out.push('\n');

    let ordered = build_transcript_collection(transcripts);
    let _ = writeln!(out, "TRANSCRIPTS ({})", ordered.len());
    for transcript in ordered {
        let episode = transcript
            .owner_episode
            .map(|e| e.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "  {:>4} {}", episode, transcript.storage_key);
    }
    out.push('\n');
    out
}

/// Normalized collections as the site would render them
pub fn render_collections(
    records: &[ContentRecord],
    policy: VisibilityPolicy,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    for field in [TaxonomyField::Categories, TaxonomyField::Tags] {
        let collection = build_collection(records, field, policy, now);
        let _ = writeln!(out, "{} ({})", field.label().to_uppercase(), collection.len());
        for bucket in collection.values() {
            let _ = writeln!(
                out,
                "  {} [{}] {}",
                bucket.display_name,
                bucket.key,
                bucket.members.len()
            );
        }
        out.push('\n');
    }
    out
}

/// Every spelling as written, so capitalization variants stand out
pub fn render_tally(records: &[ContentRecord]) -> String {
    let mut out = String::new();
    for field in [TaxonomyField::Categories, TaxonomyField::Tags] {
        let entries = tally(records, field);
        let _ = writeln!(out, "{} ({})", field.label().to_uppercase(), entries.len());
        for entry in entries {
            let _ = writeln!(out, "  {} ({})", entry.value, entry.count);
        }
        out.push('\n');
    }
    out
}
