//! Common error types for the podcast content tools

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for podcast content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the podcast content tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Front matter could not be parsed or serialized
    #[error("Front matter error in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    /// Document parsed but lacks attributes a record requires
    #[error("Invalid record {path}: {message}")]
    InvalidRecord { path: PathBuf, message: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn front_matter(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::FrontMatter {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_record(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::InvalidRecord {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
