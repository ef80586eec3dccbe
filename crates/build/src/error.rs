//! Error types for the build pipeline
//!
//! One enum covers the whole crate so embedders match on a single surface:
//! spawn problems, lifecycle misuse, missing tools, and I/O faults.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Error type for all build-pipeline operations
#[derive(Error, Debug)]
pub enum BuildError {
    /// A required input was empty or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The runner already supervises a live child process
    #[error("a child process is already running")]
    AlreadyRunning,

    /// The OS could not create the child process
    #[error("failed to spawn `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading a child stream or a persisted file failed
    #[error("i/o error: {0}")]
    IoRead(#[from] std::io::Error),

    /// A required resource (binary, directory) is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation was interrupted by an explicit cancel
    #[error("operation cancelled")]
    Cancelled,

    /// A line matched none of the registered diagnostic parsers
    #[error("line matched no diagnostic format")]
    ParseFailed,
}

impl BuildError {
    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        BuildError::InvalidArgument(msg.into())
    }

    /// Create a spawn-failure error carrying the program name
    pub fn spawn_failed(program: impl Into<String>, source: std::io::Error) -> Self {
        BuildError::SpawnFailed {
            program: program.into(),
            source,
        }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        BuildError::NotFound(what.into())
    }

    /// Whether the error signals a lifecycle misuse rather than an OS fault
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, BuildError::AlreadyRunning | BuildError::Cancelled)
    }
}
