//! Content store and media folder scanning

use podcast_common::media_key::{episode_number_prefix, media_extension};
use podcast_common::records::DOCUMENT_EXTENSION;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Recursive document discovery
pub struct DocumentScanner {
    ignore_patterns: Vec<String>,
}

impl DocumentScanner {
    /// Ignores editor, VCS and build folders
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                ".git".to_string(),
                "node_modules".to_string(),
                "_site".to_string(),
            ],
        }
    }

    /// Every `.md` file under `root`, in path order
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        check_dir(root)?;

        let mut documents = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_document(entry.path()) {
                        documents.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(
            root = %root.display(),
            documents = documents.len(),
            "Document scan complete"
        );
        Ok(documents)
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        // The root itself is always walked, whatever its name
        if entry.depth() == 0 {
            return true;
        }
        let file_name = entry.file_name().to_string_lossy();
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| file_name.contains(pattern.as_str()))
    }
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbered media files directly inside `media_dir`, sorted by name
///
/// Only files with `extension` and a leading episode number of at least
/// `from_episode` are returned.
pub fn scan_numbered_media(
    media_dir: &Path,
    extension: &str,
    from_episode: i64,
) -> Result<Vec<PathBuf>, ScanError> {
    check_dir(media_dir)?;

    let mut files: Vec<PathBuf> = WalkDir::new(media_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Error accessing entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            media_extension(&name).as_deref() == Some(extension)
                && episode_number_prefix(&name).is_some_and(|n| n >= from_episode)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

fn check_dir(path: &Path) -> Result<(), ScanError> {
    if !path.exists() {
        return Err(ScanError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ScanError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finds_documents_recursively() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("2019-05-02")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("2019-05-02/post.md"), "x").unwrap();
        std::fs::write(dir.path().join("2019-05-02/cover.jpg"), "x").unwrap();
        std::fs::write(dir.path().join(".git/notes.md"), "x").unwrap();
        std::fs::write(dir.path().join("about.MD"), "x").unwrap();

        let found = DocumentScanner::new().scan(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| !p.to_string_lossy().contains(".git")));
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = DocumentScanner::new().scan(&dir.path().join("absent"));
        assert!(matches!(result, Err(ScanError::PathNotFound(_))));
    }

    #[test]
    fn test_numbered_media_filter() {
        let dir = TempDir::new().unwrap();
        for name in ["003-a.mp3", "004-b.mp3", "010-c.mp3", "bonus.mp3", "005-d.m4a", "006-e.md"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        let found = scan_numbered_media(dir.path(), "mp3", 4).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["004-b.mp3", "010-c.mp3"]);
    }
}
