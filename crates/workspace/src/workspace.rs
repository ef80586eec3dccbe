//! Workspace model
//!
//! The current project root plus its persistence and change fan-out.
//! Collaborators that must react to a root switch (file tree, index,
//! watcher) attach as [`WorkspaceObserver`]s; the model stays free of any
//! UI types.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, WorkspaceError};

#[derive(Serialize, Deserialize)]
struct PersistedWorkspace {
    root_dir: PathBuf,
}

/// Reacts to workspace root changes
pub trait WorkspaceObserver: Send {
    fn root_changed(&self, root: &Path);
}

pub struct Workspace {
    root_dir: PathBuf,
    store: PathBuf,
    observers: Vec<Box<dyn WorkspaceObserver>>,
}

impl Workspace {
    /// Model persisting to `store` (a `workspace.json` path), starting at
    /// `default_root` until a restore or explicit change
    #[must_use]
    pub fn new(store: impl Into<PathBuf>, default_root: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: default_root.into(),
            store: store.into(),
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    #[must_use]
    pub fn store_path(&self) -> &Path {
        &self.store
    }

    pub fn add_observer(&mut self, observer: Box<dyn WorkspaceObserver>) {
        self.observers.push(observer);
    }

    /// Switch the root: persist, then notify every observer
    ///
    /// A failed save is logged and does not block the switch; the
    /// in-memory root and the observers always agree.
    pub fn set_root(&mut self, dir: &Path) {
        self.root_dir = dir.to_path_buf();
        if let Err(err) = self.save() {
            warn!(store = %self.store.display(), %err, "cannot persist workspace root");
        }
        info!(root = %self.root_dir.display(), "workspace root changed");
        for observer in &self.observers {
            observer.root_changed(&self.root_dir);
        }
    }

    /// Write the current state as pretty JSON
    pub fn save(&self) -> Result<()> {
        let state = PersistedWorkspace {
            root_dir: self.root_dir.clone(),
        };
        let text = serde_json::to_string_pretty(&state)
            .map_err(|err| WorkspaceError::Persist(err.to_string()))?;
        fs::write(&self.store, text)?;
        Ok(())
    }

    /// Re-apply the persisted root, if any
    ///
    /// Returns whether a stored root was found and applied. Missing or
    /// unreadable state leaves the current root untouched.
    pub fn restore(&mut self) -> bool {
        let Ok(text) = fs::read_to_string(&self.store) else {
            debug!(store = %self.store.display(), "no persisted workspace state");
            return false;
        };
        match serde_json::from_str::<PersistedWorkspace>(&text) {
            Ok(state) => {
                let root = state.root_dir;
                self.set_root(&root);
                true
            }
            Err(err) => {
                warn!(store = %self.store.display(), %err, "workspace state unparsable, keeping defaults");
                false
            }
        }
    }
}
