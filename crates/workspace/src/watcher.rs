//! Recursive directory watcher
//!
//! The OS backends here only watch single directories, so recursion is
//! assembled by hand: one non-recursive watch on the root plus one per
//! subdirectory found at scan time. Hidden directories are watched too
//! (state under `.git` and friends still changes on disk); symlinked
//! directories are not, mirroring the file index.
//!
//! Known limitation: directories created after the scan are not watched
//! until the next `set_root` or `rescan`.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// Normalized change classes across backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEventKind {
    Created,
    Modified,
    Removed,
    Other,
}

impl From<&EventKind> for PathEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => PathEventKind::Created,
            EventKind::Modify(_) => PathEventKind::Modified,
            EventKind::Remove(_) => PathEventKind::Removed,
            _ => PathEventKind::Other,
        }
    }
}

/// One normalized filesystem change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEvent {
    pub kind: PathEventKind,
    pub path: PathBuf,
}

/// Watches a directory tree through per-directory OS watches
///
/// The callback runs on the backend thread; marshal before touching
/// anything thread-bound.
pub struct RecursiveWatcher {
    watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
    watched: Vec<PathBuf>,
}

impl RecursiveWatcher {
    /// Watch `root` and its current subdirectories
    ///
    /// The callback is fixed for the watcher's lifetime. Creation fails
    /// only when the OS backend cannot be initialized; unwatchable
    /// directories are logged and skipped.
    pub fn new(root: &Path, callback: impl Fn(PathEvent) + Send + 'static) -> Result<Self> {
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let kind = PathEventKind::from(&event.kind);
                for path in event.paths {
                    callback(PathEvent { kind, path });
                }
            }
            Err(err) => warn!(%err, "watch backend error"),
        })?;
        let mut this = Self {
            watcher,
            roots: Vec::new(),
            watched: Vec::new(),
        };
        this.add_root(root);
        Ok(this)
    }

    /// Replace every watch with the tree under `root`
    pub fn set_root(&mut self, root: &Path) {
        self.unwatch_all();
        self.roots.clear();
        self.roots.push(root.to_path_buf());
        self.watch_tree(root);
        debug!(root = %root.display(), watches = self.watched.len(), "watch root replaced");
    }

    /// Register an additional root
    ///
    /// A file argument watches its parent directory. A directory that is
    /// already a root is not appended again; its tree is rescanned so new
    /// subdirectories get picked up.
    pub fn add_root(&mut self, path: &Path) {
        let dir = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };
        let dir = dir.to_path_buf();
        if !self.roots.contains(&dir) {
            self.roots.push(dir.clone());
        }
        self.watch_tree(&dir);
    }

    /// Tear down and rebuild the watches of every registered root
    pub fn rescan(&mut self) {
        self.unwatch_all();
        let roots = self.roots.clone();
        for root in &roots {
            self.watch_tree(root);
        }
        debug!(roots = roots.len(), watches = self.watched.len(), "watches rebuilt");
    }

    /// Directories currently under an OS watch
    #[must_use]
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched
    }

    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn watch_tree(&mut self, root: &Path) {
        let dirs = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_dir() => Some(entry.into_path()),
                Ok(_) => None,
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    None
                }
            });
        for dir in dirs {
            if self.watched.contains(&dir) {
                continue;
            }
            match self.watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => self.watched.push(dir),
                Err(err) => warn!(dir = %dir.display(), %err, "cannot watch directory, skipping"),
            }
        }
    }

    fn unwatch_all(&mut self) {
        for dir in self.watched.drain(..) {
            if let Err(err) = self.watcher.unwatch(&dir) {
                debug!(dir = %dir.display(), %err, "unwatch failed (directory may be gone)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn kinds_map_per_family() {
        use notify::event::{CreateKind, ModifyKind, RemoveKind};
        assert_eq!(
            PathEventKind::from(&EventKind::Create(CreateKind::File)),
            PathEventKind::Created
        );
        assert_eq!(
            PathEventKind::from(&EventKind::Modify(ModifyKind::Any)),
            PathEventKind::Modified
        );
        assert_eq!(
            PathEventKind::from(&EventKind::Remove(RemoveKind::File)),
            PathEventKind::Removed
        );
        assert_eq!(PathEventKind::from(&EventKind::Any), PathEventKind::Other);
    }

    #[test]
    fn watches_root_and_subdirs_including_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        let watcher = RecursiveWatcher::new(dir.path(), |_| {}).unwrap();
        let watched = watcher.watched_dirs();
        assert_eq!(watched.len(), 3);
        assert!(watched.iter().any(|d| d.ends_with("sub")));
        assert!(watched.iter().any(|d| d.ends_with(".hidden")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_dirs_are_not_watched() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("linkdir")).unwrap();
        let watcher = RecursiveWatcher::new(dir.path(), |_| {}).unwrap();
        assert!(!watcher.watched_dirs().iter().any(|d| d.ends_with("linkdir")));
    }

    #[test]
    fn file_root_watches_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.c");
        fs::write(&file, "").unwrap();
        let watcher = RecursiveWatcher::new(&file, |_| {}).unwrap();
        assert!(watcher
            .watched_dirs()
            .iter()
            .any(|d| d.as_path() == dir.path()));
    }

    #[test]
    fn set_root_replaces_watches() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::create_dir(second.path().join("sub")).unwrap();
        let mut watcher = RecursiveWatcher::new(first.path(), |_| {}).unwrap();
        watcher.set_root(second.path());
        let watched = watcher.watched_dirs();
        assert_eq!(watched.len(), 2);
        assert!(watched.iter().all(|d| d.starts_with(second.path())));
        assert_eq!(watcher.roots(), &[second.path().to_path_buf()]);
    }

    #[test]
    fn adding_an_existing_root_rescans_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut watcher = RecursiveWatcher::new(dir.path(), |_| {}).unwrap();
        watcher.add_root(dir.path());
        assert_eq!(watcher.roots().len(), 1);
        assert_eq!(watcher.watched_dirs().len(), 2);
        watcher.rescan();
        assert_eq!(watcher.watched_dirs().len(), 2);
    }

    #[test]
    fn rescan_picks_up_new_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = RecursiveWatcher::new(dir.path(), |_| {}).unwrap();
        assert_eq!(watcher.watched_dirs().len(), 1);
        fs::create_dir(dir.path().join("later")).unwrap();
        watcher.rescan();
        assert_eq!(watcher.watched_dirs().len(), 2);
    }
}
