//! Session persistence
//!
//! The last opened file and caret position, written to `session.json` so
//! the editor reopens where the user left off. Carets are 1-based; an
//! empty `last_file` means no file was open.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, WorkspaceError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub last_file: String,
    #[serde(default = "caret_default")]
    pub caret_line: u32,
    #[serde(default = "caret_default")]
    pub caret_col: u32,
}

fn caret_default() -> u32 {
    1
}

impl Default for Session {
    fn default() -> Self {
        Self {
            last_file: String::new(),
            caret_line: 1,
            caret_col: 1,
        }
    }
}

impl Session {
    /// Load from `path`; missing or unreadable state yields the defaults
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        let mut session = match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(session) => session,
                Err(err) => {
                    warn!(path = %path.display(), %err, "session unparsable, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                debug!(path = %path.display(), %err, "session missing, using defaults");
                Self::default()
            }
        };
        session.normalize();
        session
    }

    /// Write pretty JSON to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|err| WorkspaceError::Persist(err.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Record the caret position in a file
    pub fn remember(&mut self, file: impl Into<String>, line: u32, col: u32) {
        self.last_file = file.into();
        self.caret_line = line.max(1);
        self.caret_col = col.max(1);
    }

    #[must_use]
    pub fn has_last_file(&self) -> bool {
        !self.last_file.is_empty()
    }

    /// Carets are 1-based; a persisted 0 is clamped
    fn normalize(&mut self) {
        self.caret_line = self.caret_line.max(1);
        self.caret_col = self.caret_col.max(1);
    }
}
