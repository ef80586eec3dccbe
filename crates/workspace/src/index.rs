//! File index
//!
//! Flat, sorted snapshot of every file under a workspace root. Hidden
//! entries (leading dot) are excluded and symlinked directories are not
//! entered; a symlink to a file is indexed at its canonical target. The
//! result is deterministic for fixed filesystem contents, which keeps tree
//! views and diffs stable across rescans.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, WorkspaceError};

pub struct FileIndex {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl FileIndex {
    /// Enumerate everything under `root`
    ///
    /// The root is canonicalized first; a missing root is
    /// [`WorkspaceError::NotFound`]. A root that is itself a regular file
    /// yields a one-entry index.
    pub fn build(root: &Path) -> Result<Self> {
        let root = canonicalize_root(root)?;
        if root.is_file() {
            let files = vec![root.clone()];
            return Ok(Self { root, files });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            let file_type = entry.file_type();
            if file_type.is_file() {
                push_canonical(&mut files, entry.path());
            } else if file_type.is_symlink() {
                // Index a file target at its canonical path; a directory
                // target is neither entered nor listed.
                if fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false) {
                    push_canonical(&mut files, entry.path());
                }
            }
        }

        files.sort_by(|a, b| a.as_os_str().as_encoded_bytes().cmp(b.as_os_str().as_encoded_bytes()));
        files.dedup();
        debug!(root = %root.display(), count = files.len(), "file index built");
        Ok(Self { root, files })
    }

    /// Rescan under the current root
    pub fn refresh(&mut self) -> Result<()> {
        *self = Self::build(&self.root)?;
        Ok(())
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn canonicalize_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            WorkspaceError::not_found(root.display().to_string())
        } else {
            WorkspaceError::Io(err)
        }
    })
}

fn push_canonical(files: &mut Vec<PathBuf>, path: &Path) {
    match path.canonicalize() {
        Ok(path) => files.push(path),
        Err(err) => warn!(path = %path.display(), %err, "cannot canonicalize, skipping"),
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}
