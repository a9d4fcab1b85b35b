//! Content store fixtures
//!
//! A temporary content store with staging and media folders laid out the
//! way the reconciliation commands expect.

use podcast_common::media_key::canonical_transcript_key;
use podcast_reconcile::{Operation, RunContext, RunSummary, Settings, StoreIndex};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use walkdir::WalkDir;

pub const LEGACY_PREFIX: &str = "https://twistoflemonpod.s3.us-east-2.amazonaws.com/episodes/";
pub const EPISODE_MEDIA: &str = "043-show-20190502.mp3";

/// Minimal MPEG audio: an ID3 header followed by padding
pub const MP3_BYTES: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x00padding-bytes";

/// Temporary content, staging and media folders
///
/// The TempDir must be kept alive for the duration of the test.
pub struct TestStore {
    _temp: TempDir,
    pub content: PathBuf,
    pub staging: PathBuf,
    pub media: PathBuf,
}

impl TestStore {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let content = temp.path().join("content");
        let staging = temp.path().join("staging");
        let media = temp.path().join("media");
        for dir in [&content, &staging, &media] {
            fs::create_dir_all(dir).expect("Failed to create store folder");
        }
        Self {
            _temp: temp,
            content,
            staging,
            media,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings::for_dirs(&self.content, &self.staging, &self.media)
    }

    /// Write a file relative to the content folder
    pub fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.content.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&path, text).expect("Failed to write fixture");
        path
    }

    /// Write a post with front matter built from `yaml` lines
    pub fn write_post(&self, relative: &str, yaml: &str, body: &str) -> PathBuf {
        self.write(relative, &format!("---\n{yaml}---\n{body}"))
    }

    /// Episode 43 post in its date folder, enclosure still on the legacy host
    pub fn write_episode_post(&self) -> PathBuf {
        self.write_post(
            "2019-05-02/43-show.md",
            &format!(
                "title: The Show\n\
                 date: 2019-05-02T06:00:00.000Z\n\
                 slug: show\n\
                 episode: 43\n\
                 categories:\n  - Technology\n\
                 enclosure:\n  url: {LEGACY_PREFIX}{EPISODE_MEDIA}\n  length: 1\n  type: audio/mpeg\n"
            ),
            "Dear Listener,\n\n\
             This week we talk about lemons, limes and the finer points of keeping a podcast archive tidy.\n\n\
             Thanks for listening and we'll talk to you soon,\n\n\
             Stan Lemon & Jon Kohlmeier\n",
        )
    }

    /// Staged transcript named after the media file
    pub fn stage_transcript(&self, media_filename: &str) -> PathBuf {
        let path = self.staging.join(canonical_transcript_key(media_filename));
        fs::write(&path, "**SPEAKER_0** [00:00:00]\n\nWelcome to the show.\n\n")
            .expect("Failed to stage transcript");
        path
    }

    /// Local media mirror file
    pub fn write_media(&self, media_filename: &str) -> PathBuf {
        let path = self.media.join(media_filename);
        fs::write(&path, MP3_BYTES).expect("Failed to write media");
        path
    }

    pub fn index(&self) -> StoreIndex {
        StoreIndex::build(&self.content).expect("Failed to index store")
    }

    /// Index the store and run one batch over it
    pub async fn run(&self, operation: &dyn Operation, dry_run: bool) -> RunSummary {
        let settings = self.settings();
        let index = self.index();
        let ctx = RunContext::new(&settings, &index, dry_run);
        podcast_reconcile::run_batch(operation, &ctx)
            .await
            .expect("Batch failed to start")
    }

    /// Every file under the content and staging folders with its bytes
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        for root in [&self.content, &self.staging] {
            for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
                if entry.file_type().is_file() {
                    let bytes = fs::read(entry.path()).expect("Failed to read snapshot file");
                    files.insert(entry.path().to_path_buf(), bytes);
                }
            }
        }
        files
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.content.join(relative).exists()
    }

    pub fn read_document(&self, relative: &str) -> podcast_common::Document {
        podcast_common::Document::read(&self.content.join(relative))
            .expect("Failed to read document")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.content.join(relative)
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}
