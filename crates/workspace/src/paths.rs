//! Persistence locations
//!
//! One place that knows where the JSON state files live. Everything sits in
//! a single `config/` directory under a caller-chosen base, so tests can
//! point the whole persistence layer at a temp dir.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    dir: PathBuf,
}

impl ConfigDir {
    /// `config/` under `base`
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            dir: base.into().join("config"),
        }
    }

    /// Use `dir` itself, no `config/` suffix
    #[must_use]
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the directory (and parents) if needed
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn workspace_file(&self) -> PathBuf {
        self.dir.join("workspace.json")
    }

    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.dir.join("session.json")
    }

    #[must_use]
    pub fn recent_file(&self) -> PathBuf {
        self.dir.join("recent.json")
    }

    #[must_use]
    pub fn run_config_file(&self) -> PathBuf {
        self.dir.join("run_config.json")
    }
}
