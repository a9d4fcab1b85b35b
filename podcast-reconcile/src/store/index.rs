//! In-memory index of the content store
//!
//! Built once per run from a full scan. Every document is classified as a
//! transcript (named `transcript.md` or carrying `type: transcript`) or a
//! content record, and can be looked up by directory or by owner key.
//! Documents that fail to parse stay in the index, classified by file name,
//! so the operations that would have handled them can report them.

use super::scanner::{DocumentScanner, ScanError};
use crate::error::{ReconcileError, ReconcileResult};
use podcast_common::records::{OwnerKey, TRANSCRIPT_WORKING_NAME};
use podcast_common::{ContentRecord, Document, TranscriptArtifact};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What a document is to reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Record,
    Transcript,
}

#[derive(Debug, Clone)]
pub enum Loaded {
    Record(ContentRecord),
    Transcript(TranscriptArtifact),
    /// Parse failure, or a post lacking its title or date
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub path: PathBuf,
    pub role: Role,
    /// Parsed document; `None` only when the front matter was unparseable
    pub document: Option<Document>,
    pub loaded: Loaded,
}

impl IndexEntry {
    /// Load and classify one document
    pub fn load(path: &Path) -> Self {
        let named_transcript = path
            .file_name()
            .is_some_and(|name| name == TRANSCRIPT_WORKING_NAME);

        let document = match Document::read(path) {
            Ok(document) => document,
            Err(e) => {
                return Self {
                    path: path.to_path_buf(),
                    role: if named_transcript { Role::Transcript } else { Role::Record },
                    document: None,
                    loaded: Loaded::Unreadable(e.to_string()),
                }
            }
        };

        if named_transcript || document.is_transcript() {
            let artifact = TranscriptArtifact::from_document(path, &document);
            return Self {
                path: path.to_path_buf(),
                role: Role::Transcript,
                document: Some(document),
                loaded: Loaded::Transcript(artifact),
            };
        }

        let loaded = match ContentRecord::from_document(path, &document) {
            Ok(record) => Loaded::Record(record),
            Err(e) => Loaded::Unreadable(e.to_string()),
        };
        Self {
            path: path.to_path_buf(),
            role: Role::Record,
            document: Some(document),
            loaded,
        }
    }

    pub fn record(&self) -> Option<&ContentRecord> {
        match &self.loaded {
            Loaded::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn transcript(&self) -> Option<&TranscriptArtifact> {
        match &self.loaded {
            Loaded::Transcript(artifact) => Some(artifact),
            _ => None,
        }
    }

    fn unreadable(&self) -> ReconcileError {
        let reason = match &self.loaded {
            Loaded::Unreadable(reason) => reason.clone(),
            _ => "not the expected kind of document".to_string(),
        };
        ReconcileError::Unreadable {
            path: self.path.clone(),
            reason,
        }
    }

    /// Loaded record plus its document, or the reason it is unusable
    pub fn require_record(&self) -> ReconcileResult<(&Document, &ContentRecord)> {
        match (&self.document, &self.loaded) {
            (Some(document), Loaded::Record(record)) => Ok((document, record)),
            _ => Err(self.unreadable()),
        }
    }

    /// Loaded transcript plus its document, or the reason it is unusable
    pub fn require_transcript(&self) -> ReconcileResult<(&Document, &TranscriptArtifact)> {
        match (&self.document, &self.loaded) {
            (Some(document), Loaded::Transcript(artifact)) => Ok((document, artifact)),
            _ => Err(self.unreadable()),
        }
    }

    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Snapshot of the content store taken at the start of a run
#[derive(Debug, Default)]
pub struct StoreIndex {
    entries: Vec<IndexEntry>,
    by_path: HashMap<PathBuf, usize>,
    by_directory: HashMap<PathBuf, Vec<usize>>,
    records_by_owner: HashMap<OwnerKey, Vec<usize>>,
    transcripts_by_owner: HashMap<OwnerKey, Vec<usize>>,
}

impl StoreIndex {
    /// Scan `content_dir` and load every document
    pub fn build(content_dir: &Path) -> Result<Self, ScanError> {
        let paths = DocumentScanner::new().scan(content_dir)?;
        let index = Self::from_entries(paths.iter().map(|p| IndexEntry::load(p)).collect());

        tracing::info!(
            content_dir = %content_dir.display(),
            records = index.records().count(),
            transcripts = index.transcripts().count(),
            unreadable = index.unreadable_count(),
            "Content store indexed"
        );

        Ok(index)
    }

    pub fn from_entries(entries: Vec<IndexEntry>) -> Self {
        let mut index = Self {
            entries,
            ..Self::default()
        };

        for (i, entry) in index.entries.iter().enumerate() {
            index.by_path.insert(entry.path.clone(), i);
            index
                .by_directory
                .entry(entry.directory().to_path_buf())
                .or_default()
                .push(i);

            match &entry.loaded {
                Loaded::Record(record) => {
                    let key = record.owner_key();
                    if !key.is_empty() {
                        index.records_by_owner.entry(key).or_default().push(i);
                    }
                }
                Loaded::Transcript(artifact) if artifact.attached => {
                    let key = artifact.owner_key();
                    if !key.is_empty() {
                        index.transcripts_by_owner.entry(key).or_default().push(i);
                    }
                }
                _ => {}
            }
        }

        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&IndexEntry> {
        self.by_path.get(path).map(|&i| &self.entries[i])
    }

    /// Entries classified as content records, readable or not
    pub fn records(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter().filter(|e| e.role == Role::Record)
    }

    /// Entries classified as transcripts, readable or not
    pub fn transcripts(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter().filter(|e| e.role == Role::Transcript)
    }

    pub fn unreadable_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.loaded, Loaded::Unreadable(_)))
            .count()
    }

    /// Loaded content records in `dir`, with their documents
    pub fn records_in_dir(&self, dir: &Path) -> Vec<&IndexEntry> {
        self.by_directory
            .get(dir)
            .map(|ids| {
                ids.iter()
                    .map(|&i| &self.entries[i])
                    .filter(|e| e.record().is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Content records whose `(episode, slug)` equals `key`
    pub fn records_owned_by(&self, key: &OwnerKey) -> Vec<&IndexEntry> {
        self.lookup(&self.records_by_owner, key)
    }

    /// Attached transcripts that name `key` as their owner
    pub fn transcripts_owned_by(&self, key: &OwnerKey) -> Vec<&IndexEntry> {
        self.lookup(&self.transcripts_by_owner, key)
    }

    /// Content records, loaded and valid
    pub fn content_records(&self) -> Vec<ContentRecord> {
        self.entries
            .iter()
            .filter_map(|e| e.record().cloned())
            .collect()
    }

    /// Transcript artifacts that parsed
    pub fn transcript_artifacts(&self) -> Vec<TranscriptArtifact> {
        self.entries
            .iter()
            .filter_map(|e| e.transcript().cloned())
            .collect()
    }

    fn lookup(&self, map: &HashMap<OwnerKey, Vec<usize>>, key: &OwnerKey) -> Vec<&IndexEntry> {
        map.get(key)
            .map(|ids| ids.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }
}
