//! Error types for bundle operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during bundle operations.
#[derive(Error, Debug)]
pub enum BundleError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file
    #[error("I/O error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Mandatory files absent from the project tree
    #[error("missing mandatory files: {}", .0.join(", "))]
    MissingMandatory(Vec<String>),

    /// Nothing was gathered for the archive or manifest
    #[error("no files gathered under {0}")]
    NothingGathered(PathBuf),

    /// A layout path escapes the project root or is otherwise unusable
    #[error("invalid layout path '{path}': {reason}")]
    InvalidLayoutPath { path: String, reason: String },
}

impl BundleError {
    /// Wrap an I/O error with the path it happened on.
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BundleError::FileIo {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the caller's inputs rather than the filesystem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BundleError::MissingMandatory(_)
                | BundleError::NothingGathered(_)
                | BundleError::InvalidLayoutPath { .. }
        )
    }
}

/// Result type alias for bundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;
