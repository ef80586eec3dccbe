//! Recent files
//!
//! Bounded most-recent-first list of opened paths, persisted as a plain
//! JSON array in `recent.json`. Re-adding an entry moves it to the front
//! instead of duplicating it.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, WorkspaceError};

const DEFAULT_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFiles {
    items: Vec<String>,
    max_items: usize,
}

impl Default for RecentFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentFiles {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max(DEFAULT_MAX)
    }

    /// List bounded to `max_items` entries (minimum 1)
    #[must_use]
    pub fn with_max(max_items: usize) -> Self {
        Self {
            items: Vec::new(),
            max_items: max_items.max(1),
        }
    }

    /// Load from `path`; missing or unreadable state yields an empty list
    ///
    /// Empty strings in the stored array are dropped and the bound is
    /// re-applied, so a hand-edited file cannot overflow the list.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        let mut recent = Self::new();
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<Vec<String>>(&text) {
                Ok(items) => {
                    recent.items = items.into_iter().filter(|p| !p.is_empty()).collect();
                    recent.items.truncate(recent.max_items);
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "recent list unparsable, starting empty");
                }
            },
            Err(err) => {
                debug!(path = %path.display(), %err, "recent list missing, starting empty");
            }
        }
        recent
    }

    /// Write the list as pretty JSON
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.items)
            .map_err(|err| WorkspaceError::Persist(err.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Put `path` at the front, deduplicating and trimming the tail
    ///
    /// Empty paths are ignored.
    pub fn add(&mut self, path: &str) {
        if path.is_empty() {
            return;
        }
        self.items.retain(|existing| existing != path);
        self.items.insert(0, path.to_owned());
        self.items.truncate(self.max_items);
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_entries_come_first() {
        let mut recent = RecentFiles::new();
        recent.add("a.c");
        recent.add("b.c");
        assert_eq!(recent.items(), ["b.c", "a.c"]);
    }

    #[test]
    fn readd_moves_to_front_without_growth() {
        let mut recent = RecentFiles::new();
        recent.add("a.c");
        recent.add("b.c");
        recent.add("a.c");
        assert_eq!(recent.items(), ["a.c", "b.c"]);
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn bound_trims_the_oldest() {
        let mut recent = RecentFiles::with_max(3);
        for name in ["a", "b", "c", "d"] {
            recent.add(name);
        }
        recent.add("b");
        assert_eq!(recent.items(), ["b", "d", "c"]);
        assert_eq!(recent.len(), 3);
    }

    #[test]
    fn empty_paths_are_ignored() {
        let mut recent = RecentFiles::new();
        recent.add("");
        assert!(recent.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");
        let mut recent = RecentFiles::new();
        recent.add("one.c");
        recent.add("two.c");
        recent.save_to(&path).unwrap();
        let loaded = RecentFiles::load_from(&path);
        assert_eq!(loaded.items(), ["two.c", "one.c"]);
    }

    #[test]
    fn load_drops_empty_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");
        fs::write(&path, r#"["a.c", "", "b.c"]"#).unwrap();
        let loaded = RecentFiles::load_from(&path);
        assert_eq!(loaded.items(), ["a.c", "b.c"]);
    }

    #[test]
    fn load_missing_or_garbage_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RecentFiles::load_from(&dir.path().join("recent.json")).is_empty());
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "not json").unwrap();
        assert!(RecentFiles::load_from(&bad).is_empty());
    }
}
