//! Media upload to object storage

use crate::adapters::MediaUploader;
use crate::error::{ReconcileError, ReconcileResult};
use podcast_common::media_key::media_extension;
use std::path::Path;

/// Key prefix for episode media in the bucket
pub const MEDIA_KEY_PREFIX: &str = "episodes/";
const UPLOADABLE_EXTENSION: &str = "mp3";

/// Object key for a file: the explicit key, or `episodes/<file name>`
pub fn object_key(file: &Path, explicit: Option<&str>) -> ReconcileResult<String> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ReconcileError::InvalidInput(format!("not a file: {}", file.display())))?;
    Ok(format!("{MEDIA_KEY_PREFIX}{name}"))
}

/// Validate an upload and compute its object key
pub fn prepare_upload(file: &Path, explicit_key: Option<&str>) -> ReconcileResult<String> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if media_extension(&name).as_deref() != Some(UPLOADABLE_EXTENSION) {
        return Err(ReconcileError::InvalidInput(format!(
            "only .{UPLOADABLE_EXTENSION} files can be uploaded: {}",
            file.display()
        )));
    }
    if !file.is_file() {
        return Err(ReconcileError::MediaNotFound(file.to_path_buf()));
    }
    object_key(file, explicit_key)
}

/// Upload one episode file, returning its stored URL
pub async fn upload_media(
    uploader: &dyn MediaUploader,
    file: &Path,
    explicit_key: Option<&str>,
) -> ReconcileResult<String> {
    let key = prepare_upload(file, explicit_key)?;
    let url = uploader.upload(file, &key).await?;
    tracing::info!(url = %url, "Upload complete");
    Ok(url)
}
