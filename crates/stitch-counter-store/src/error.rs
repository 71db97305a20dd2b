//! Error types for project library operations.

use stitch_counter_core::ProjectId;
use thiserror::Error;

/// Errors that can occur during `JsonStore` operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Project was not found in the library.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Failed to parse or serialize library JSON.
    #[error("Library JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backup file was written by an unsupported format version.
    #[error("Unsupported backup version: {0}")]
    UnsupportedBackupVersion(u32),

    /// Every project id is taken.
    #[error("No project ids left; the largest id is already in use")]
    IdsExhausted,

    /// Failed to acquire the library write lock.
    #[error("Library lock error")]
    LockError,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other unclassified error.
    #[error("Other error: {0}")]
    Other(String),
}

impl From<tempfile::PersistError> for StoreError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::IoError(err.error)
    }
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, StoreError>;
