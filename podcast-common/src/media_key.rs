//! Media file name extraction
//!
//! The enclosure URL is the only reliable link between a post, its audio in
//! the local mirror, and its transcript. Media has moved between hosts
//! (direct object storage, then a CDN), so the join key is the trailing file
//! name segment alone. Scheme and host are not inspected.

use crate::records::DOCUMENT_EXTENSION;

/// File name token after the last `/` of an enclosure URL
///
/// Returns `None` for a missing URL or one ending in `/`.
pub fn extract_media_filename(enclosure_url: Option<&str>) -> Option<String> {
    let url = enclosure_url?.trim();
    let filename = match url.rsplit_once('/') {
        Some((_, tail)) => tail,
        None => url,
    };
    if filename.is_empty() {
        None
    } else {
        Some(filename.to_string())
    }
}

/// Base name of a media file name (extension removed)
pub fn media_stem(media_filename: &str) -> &str {
    match media_filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => media_filename,
    }
}

/// Extension of a media file name, lower-cased
pub fn media_extension(media_filename: &str) -> Option<String> {
    match media_filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

/// Canonical transcript key for a media file name
///
/// `043-show-20190502.mp3` becomes `043-show-20190502.md`.
pub fn canonical_transcript_key(media_filename: &str) -> String {
    format!("{}.{}", media_stem(media_filename), DOCUMENT_EXTENSION)
}

/// Leading episode number of a media file name (`043-show.mp3` is 43)
pub fn episode_number_prefix(media_filename: &str) -> Option<i64> {
    let (digits, _) = media_filename.split_once('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Content type for a media file name, by extension
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "mp3" => Some("audio/mpeg"),
        "m4a" | "mp4" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "ogg" | "oga" => Some("audio/ogg"),
        "opus" => Some("audio/opus"),
        "flac" => Some("audio/flac"),
        "wav" => Some("audio/wav"),
        _ => None,
    }
}
