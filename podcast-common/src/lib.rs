//! # Podcast Common Library
//!
//! Shared code for the podcast content tools including:
//! - Document (front matter + body) reading and writing
//! - Content record and transcript artifact models
//! - Slug normalization and taxonomy collections
//! - Publish-date visibility rules
//! - Media file name extraction for cross-artifact join keys
//! - Configuration loading

pub mod config;
pub mod document;
pub mod error;
pub mod media_key;
pub mod records;
pub mod slug;
pub mod taxonomy;
pub mod time;
pub mod visibility;

pub use document::Document;
pub use error::{Error, Result};
pub use records::{ContentRecord, Enclosure, TranscriptArtifact};
pub use visibility::VisibilityPolicy;
