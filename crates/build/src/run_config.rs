//! Run configuration
//!
//! What to execute when the user hits "run": program, arguments, extra
//! environment, optional working directory. Persisted as `run_config.json`;
//! the `DX_RUN_*` environment variables override individual fields for
//! quick experiments without editing the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BuildError, Result};

/// Default program when nothing is configured
const DEFAULT_EXE: &str = "clang";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Program to execute
    pub exe: String,
    /// Arguments, not including the program
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment as `KEY=VALUE` pairs
    #[serde(default)]
    pub env: Vec<String>,
    /// Working directory; `None` inherits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            exe: DEFAULT_EXE.to_owned(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }
}

impl RunConfig {
    /// Load from `path`, fall back to defaults when the file is missing or
    /// unreadable, then apply the `DX_RUN_*` overrides
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        let mut config = match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %path.display(), %err, "run config unparsable, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                debug!(path = %path.display(), %err, "run config missing, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|name| env::var(name).ok());
        config
    }

    /// Write pretty JSON to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|err| BuildError::invalid_argument(err.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Apply field overrides from a variable source
    ///
    /// Recognized: `DX_RUN_EXE`, `DX_RUN_CWD`, `DX_RUN_ARGS`
    /// (whitespace-split), `DX_RUN_ENV` (`;`-separated `KEY=VALUE` list;
    /// entries without `=` are dropped). Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(exe) = lookup("DX_RUN_EXE").filter(|v| !v.is_empty()) {
            self.exe = exe;
        }
        if let Some(cwd) = lookup("DX_RUN_CWD").filter(|v| !v.is_empty()) {
            self.cwd = Some(PathBuf::from(cwd));
        }
        if let Some(args) = lookup("DX_RUN_ARGS").filter(|v| !v.is_empty()) {
            self.args = args.split_whitespace().map(str::to_owned).collect();
        }
        if let Some(env_list) = lookup("DX_RUN_ENV").filter(|v| !v.is_empty()) {
            self.env = env_list
                .split(';')
                .filter(|entry| entry.contains('='))
                .map(str::to_owned)
                .collect();
        }
    }

    /// Full argv: the program followed by its arguments
    #[must_use]
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(1 + self.args.len());
        argv.push(self.exe.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Environment for the runner: `None` (inherit) when nothing is set
    #[must_use]
    pub fn to_env(&self) -> Option<Vec<String>> {
        if self.env.is_empty() {
            None
        } else {
            Some(self.env.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_are_clang_with_nothing_else() {
        let config = RunConfig::default();
        assert_eq!(config.exe, "clang");
        assert!(config.args.is_empty());
        assert!(config.env.is_empty());
        assert!(config.cwd.is_none());
        assert_eq!(config.to_argv(), vec!["clang"]);
        assert!(config.to_env().is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::load_from(&dir.path().join("run_config.json"));
        assert_eq!(config.exe, "clang");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_config.json");
        let config = RunConfig {
            exe: "gcc".to_owned(),
            args: vec!["-O2".to_owned(), "main.c".to_owned()],
            env: vec!["CC=gcc".to_owned()],
            cwd: Some(PathBuf::from("/tmp/project")),
        };
        config.save_to(&path).unwrap();
        let loaded = RunConfig::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn garbage_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_config.json");
        fs::write(&path, "{ not json").unwrap();
        let config = RunConfig::load_from(&path);
        assert_eq!(config.exe, "clang");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{ "exe": "zig" }"#).unwrap();
        assert_eq!(config.exe, "zig");
        assert!(config.args.is_empty());
        assert!(config.cwd.is_none());
    }

    #[test]
    fn overrides_replace_fields() {
        let mut config = RunConfig::default();
        config.apply_overrides(|name| match name {
            "DX_RUN_EXE" => Some("tcc".to_owned()),
            "DX_RUN_ARGS" => Some("-run  main.c".to_owned()),
            "DX_RUN_ENV" => Some("A=1;malformed;B=2".to_owned()),
            "DX_RUN_CWD" => Some("/work".to_owned()),
            _ => None,
        });
        assert_eq!(config.exe, "tcc");
        assert_eq!(config.args, vec!["-run", "main.c"]);
        assert_eq!(config.env, vec!["A=1", "B=2"]);
        assert_eq!(config.cwd.as_deref(), Some(Path::new("/work")));
        assert_eq!(config.to_argv(), vec!["tcc", "-run", "main.c"]);
        assert_eq!(config.to_env(), Some(vec!["A=1".to_owned(), "B=2".to_owned()]));
    }

    #[test]
    fn empty_override_values_are_ignored() {
        let mut config = RunConfig::default();
        config.apply_overrides(|name| {
            if name == "DX_RUN_EXE" {
                Some(String::new())
            } else {
                None
            }
        });
        assert_eq!(config.exe, "clang");
    }

    #[test]
    fn no_overrides_without_variables() {
        let mut config = RunConfig::default();
        config.apply_overrides(no_env);
        assert_eq!(config, RunConfig::default());
    }
}
