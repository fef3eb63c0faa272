//! Error types for Shelf file management.

use crate::types::AccessMode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for Shelf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by path handling, permission checks and the engines.
///
/// Every engine call returns the first error it hits; nothing is aggregated.
#[derive(Debug, Error)]
pub enum Error {
    /// The path is empty, relative, or contains characters the platform rejects.
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The rejected input.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// The permission gate refused the operation.
    #[error("Access denied ({mode}) on {path:?}")]
    UnauthorizedAccess {
        /// Path the check was made against.
        path: PathBuf,
        /// The access mode that was refused.
        mode: AccessMode,
    },

    /// A directory that must exist does not.
    #[error("Directory not found: {path:?}")]
    DirectoryNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// A file that must exist does not.
    #[error("File not found: {path:?}")]
    FileNotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// The target directory name is already taken.
    #[error("Directory already exists: {path:?}")]
    DirectoryAlreadyExists {
        /// The colliding path.
        path: PathBuf,
    },

    /// The target file name is already taken.
    #[error("File already exists: {path:?}")]
    FileAlreadyExists {
        /// The colliding path.
        path: PathBuf,
    },

    /// A recursive directory copy failed part way.
    #[error("Failed to copy {source_path:?} to {destination:?}: {source}")]
    DirectoryCopyError {
        /// Directory being copied.
        source_path: PathBuf,
        /// Resolved destination.
        destination: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A directory move or merge failed part way.
    #[error("Failed to move {source_path:?} to {destination:?}: {source}")]
    DirectoryMoveError {
        /// Directory being moved.
        source_path: PathBuf,
        /// Requested destination.
        destination: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The path is already a root.
    #[error("Cannot navigate above root {path:?}")]
    CannotNavigateUp {
        /// The root path.
        path: PathBuf,
    },

    /// The permission gate could not establish who is asking.
    #[error("Platform misconfigured: {reason}")]
    PlatformMisconfigured {
        /// What could not be resolved.
        reason: String,
    },

    /// I/O error from a file-level primitive.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A blocking worker panicked or was cancelled before finishing.
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidPath`].
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
