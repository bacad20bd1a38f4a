//! Error types for the plan synchronization library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all plan-file operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No item with the given id exists in the document text
    #[error("Item with id '{id}' not found in plan text")]
    ItemNotFound { id: String },
    /// Filesystem watcher setup or subscription errors
    #[error("Watch error for path '{path}': {message}")]
    Watch { path: PathBuf, message: String },
}

impl SyncError {
    /// Creates a file system error with path context.
    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Creates a watch error with path context.
    pub fn watch(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Watch {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for plan synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;
