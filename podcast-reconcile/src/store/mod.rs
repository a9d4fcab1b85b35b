//! Content store access

pub mod index;
pub mod scanner;

pub use index::{IndexEntry, Loaded, Role, StoreIndex};
pub use scanner::{scan_numbered_media, DocumentScanner, ScanError};
