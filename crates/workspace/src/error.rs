//! Error types for workspace operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A root directory or persisted resource is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Filesystem access failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The watch backend rejected an operation
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// A value could not be serialized for persistence
    #[error("persist error: {0}")]
    Persist(String),
}

impl WorkspaceError {
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        WorkspaceError::NotFound(what.into())
    }
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;
