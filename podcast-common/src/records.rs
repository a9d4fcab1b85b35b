//! Content record and transcript artifact models
//!
//! Documents are loosely structured and hand edited. These types are the
//! validated view of them: attributes the reconciliation rules depend on are
//! typed, everything absent is an explicit `None`.

use crate::document::Document;
use crate::time::parse_publish_date;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Value of the `type` attribute marking an attached transcript
pub const TRANSCRIPT_TYPE: &str = "transcript";

/// Suffix appended to an owner's slug to form its transcript's slug
pub const TRANSCRIPT_SLUG_SUFFIX: &str = "/transcript";

/// File name given to a transcript before it is renamed to its canonical key
pub const TRANSCRIPT_WORKING_NAME: &str = "transcript.md";

/// Extension used for every document in the store
pub const DOCUMENT_EXTENSION: &str = "md";

/// Audio enclosure attached to an episode post
#[derive(Debug, Clone, PartialEq)]
pub struct Enclosure {
    pub url: String,
    pub length_bytes: Option<u64>,
    pub mime_type: Option<String>,
    pub duration_label: Option<String>,
}

impl Enclosure {
    /// Read the `enclosure` attribute; `None` unless it carries a non-blank url
    pub fn from_document(doc: &Document) -> Option<Self> {
        let mapping = doc.get_mapping("enclosure")?;
        let url = mapping
            .get("url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())?
            .to_string();

        let length_bytes = match mapping.get("length") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        Some(Self {
            url,
            length_bytes,
            mime_type: mapping.get("type").and_then(Value::as_str).map(str::to_string),
            duration_label: mapping
                .get("duration")
                .and_then(crate::document::scalar_to_string),
        })
    }
}

/// One published post or podcast episode
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub path: PathBuf,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub slug: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub episode: Option<i64>,
    pub enclosure: Option<Enclosure>,
    pub summary: Option<String>,
    pub body: String,
}

impl ContentRecord {
    /// Validate a parsed document as a content record
    ///
    /// `title` and a parseable `date` are required; everything else is optional.
    pub fn from_document(path: &Path, doc: &Document) -> Result<Self> {
        let title = doc
            .get("title")
            .and_then(crate::document::scalar_to_string)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::invalid_record(path, "missing title"))?;

        let raw_date = doc
            .get("date")
            .and_then(crate::document::scalar_to_string)
            .ok_or_else(|| Error::invalid_record(path, "missing date"))?;
        let publish_date = parse_publish_date(&raw_date)
            .ok_or_else(|| Error::invalid_record(path, format!("unparseable date '{raw_date}'")))?;

        Ok(Self {
            path: path.to_path_buf(),
            title,
            publish_date,
            slug: doc.get_text("slug"),
            categories: doc.get_string_list("categories"),
            tags: doc.get_string_list("tags"),
            episode: doc.get_i64("episode"),
            enclosure: Enclosure::from_document(doc),
            summary: doc.get_text("summary"),
            body: doc.body.clone(),
        })
    }

    /// Directory the record lives in
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn enclosure_url(&self) -> Option<&str> {
        self.enclosure.as_ref().map(|e| e.url.as_str())
    }

    /// Join key a transcript uses to refer back to this record
    pub fn owner_key(&self) -> OwnerKey {
        OwnerKey {
            episode: self.episode,
            slug: self.slug.clone(),
        }
    }
}

/// `(episode, slug)` pair linking a transcript to its owning record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerKey {
    pub episode: Option<i64>,
    pub slug: Option<String>,
}

impl OwnerKey {
    /// A key with neither part set cannot identify an owner
    pub fn is_empty(&self) -> bool {
        self.episode.is_none() && self.slug.is_none()
    }
}

/// Spoken-word transcription of one record's media
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptArtifact {
    pub path: PathBuf,
    /// File name, the artifact's identity in the store
    pub storage_key: String,
    pub title: Option<String>,
    pub owner_episode: Option<i64>,
    /// Owner slug with the `/transcript` suffix removed
    pub owner_slug: Option<String>,
    /// Carries the `type: transcript` marker
    pub attached: bool,
    pub summary: Option<String>,
    pub keywords: Vec<String>,
    pub body: String,
}

impl TranscriptArtifact {
    pub fn from_document(path: &Path, doc: &Document) -> Self {
        let owner_slug = doc.get_text("slug").map(|slug| {
            slug.strip_suffix(TRANSCRIPT_SLUG_SUFFIX)
                .map(str::to_string)
                .unwrap_or(slug)
        });

        Self {
            path: path.to_path_buf(),
            storage_key: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            title: doc.get_text("title"),
            owner_episode: doc.get_i64("episode"),
            owner_slug,
            attached: doc.is_transcript(),
            summary: doc.get_text("summary"),
            keywords: doc.get_string_list("keywords"),
            body: doc.body.clone(),
        }
    }

    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn owner_key(&self) -> OwnerKey {
        OwnerKey {
            episode: self.owner_episode,
            slug: self.owner_slug.clone(),
        }
    }
}

/// Slug a transcript carries for an owner slug
pub fn transcript_slug(owner_slug: &str) -> String {
    format!("{owner_slug}{TRANSCRIPT_SLUG_SUFFIX}")
}
