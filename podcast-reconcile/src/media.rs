//! Local media file inspection

use podcast_common::media_key::{media_extension, mime_type_for_extension};
use std::path::Path;

/// Size and content type observed on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFacts {
    pub length_bytes: u64,
    pub mime_type: Option<&'static str>,
}

/// Stat and sniff a media file
pub fn probe_media(path: &Path) -> std::io::Result<MediaFacts> {
    let metadata = std::fs::metadata(path)?;
    Ok(MediaFacts {
        length_bytes: metadata.len(),
        mime_type: detect_mime_type(path),
    })
}

/// Content type from magic bytes, falling back to the file extension
pub fn detect_mime_type(path: &Path) -> Option<&'static str> {
    match infer::get_from_path(path) {
        Ok(Some(kind)) if kind.matcher_type() == infer::MatcherType::Audio => {
            return Some(kind.mime_type());
        }
        Ok(_) => {}
        Err(e) => tracing::debug!("Cannot sniff {}: {}", path.display(), e),
    }

    let file_name = path.file_name()?.to_string_lossy();
    mime_type_for_extension(&media_extension(&file_name)?)
}
