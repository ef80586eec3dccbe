//! Ripgrep invocation layer
//!
//! Builds argv vectors for line-scoped regex searches, runs them
//! synchronously with full output capture, and locates the `rg` binary.
//! Nothing here parses match output; callers get the raw text back.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::error::{BuildError, Result};

#[cfg(windows)]
const BINARY_NAMES: &[&str] = &["rg.exe", "rg"];
#[cfg(not(windows))]
const BINARY_NAMES: &[&str] = &["rg"];

/// Captured result of one search run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// A located `rg` binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RipgrepInfo {
    pub path: PathBuf,
    /// First line of `rg --version`, when the probe succeeded
    pub version: Option<String>,
}

/// Argv for a plain line-oriented search
///
/// An empty `path` defaults to `"."`. An empty `pattern` is passed through;
/// the tool will complain on stderr and the caller surfaces that.
#[must_use]
pub fn search_args(pattern: &str, path: &str) -> Vec<String> {
    let path = if path.is_empty() { "." } else { path };
    vec![
        "rg".to_owned(),
        "-n".to_owned(),
        "--no-heading".to_owned(),
        "--color=never".to_owned(),
        pattern.to_owned(),
        path.to_owned(),
    ]
}

/// Run a search argv to completion, capturing both streams
///
/// Only the spawn itself can fail: a missing binary is [`BuildError::NotFound`],
/// any other OS refusal is [`BuildError::SpawnFailed`]. A non-zero exit
/// (e.g. "no matches") is a normal [`SearchOutput`].
pub fn run_search(argv: &[String]) -> Result<SearchOutput> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| BuildError::invalid_argument("empty search command"))?;
    let output = Command::new(program).args(args).output().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            BuildError::not_found(program.as_str())
        } else {
            BuildError::spawn_failed(program.as_str(), err)
        }
    })?;
    Ok(SearchOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Locate an `rg` binary and probe its version
///
/// The `DX_RG` environment variable takes precedence when it names an
/// executable file; otherwise the `PATH` directories are scanned in order.
pub fn discover() -> Result<RipgrepInfo> {
    let override_path = env::var_os("DX_RG");
    let search_path = env::var_os("PATH");
    let path = discover_binary(override_path.as_deref(), search_path.as_deref())
        .ok_or_else(|| BuildError::not_found("rg binary"))?;
    let version = probe_version(&path);
    info!(path = %path.display(), "ripgrep located");
    Ok(RipgrepInfo { path, version })
}

/// Pure discovery over explicit inputs, shared by [`discover`] and tests
fn discover_binary(override_path: Option<&OsStr>, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if let Some(raw) = override_path {
        if !raw.is_empty() {
            let candidate = PathBuf::from(raw);
            if is_executable(&candidate) {
                return Some(candidate);
            }
            warn!(path = %candidate.display(), "DX_RG does not name an executable, scanning PATH");
        }
    }
    for dir in env::split_paths(search_path?) {
        for name in BINARY_NAMES {
            let candidate = dir.join(name);
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// A candidate counts only when it is a regular file the process could
/// exec (on Unix, any execute bit set)
fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && has_exec_bit(&meta),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn has_exec_bit(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_meta: &fs::Metadata) -> bool {
    true
}

fn probe_version(path: &Path) -> Option<String> {
    let output = Command::new(path).arg("--version").output().ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch_exec(path: &Path) {
        fs::write(path, "").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn search_args_shape() {
        assert_eq!(
            search_args("TODO", "src"),
            vec!["rg", "-n", "--no-heading", "--color=never", "TODO", "src"]
        );
    }

    #[test]
    fn empty_path_defaults_to_cwd() {
        let argv = search_args("x", "");
        assert_eq!(argv[5], ".");
    }

    #[test]
    fn empty_pattern_still_builds() {
        let argv = search_args("", "src");
        assert_eq!(argv.len(), 6);
        assert_eq!(argv[4], "");
    }

    #[test]
    fn run_search_rejects_empty_argv() {
        assert!(matches!(
            run_search(&[]),
            Err(BuildError::InvalidArgument(_))
        ));
    }

    #[test]
    fn missing_binary_is_not_found() {
        let argv = vec!["/definitely/not/rg-xyzzy".to_owned(), "x".to_owned()];
        assert!(matches!(run_search(&argv), Err(BuildError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn run_search_captures_both_streams_and_code() {
        let argv = vec![
            "sh".to_owned(),
            "-c".to_owned(),
            "echo found-line; echo no-match 1>&2; exit 1".to_owned(),
        ];
        let out = run_search(&argv).unwrap();
        assert_eq!(out.stdout, "found-line\n");
        assert_eq!(out.stderr, "no-match\n");
        assert_eq!(out.exit_code, 1);
    }

    #[test]
    fn override_wins_when_executable_exists() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-rg");
        touch_exec(&fake);
        let found = discover_binary(Some(fake.as_os_str()), None).unwrap();
        assert_eq!(found, fake);
    }

    #[test]
    fn missing_override_falls_back_to_path_scan() {
        let dir = tempfile::tempdir().unwrap();
        touch_exec(&dir.path().join("rg"));
        let search = env::join_paths([dir.path()]).unwrap();
        let missing = dir.path().join("nope");
        let found = discover_binary(Some(missing.as_os_str()), Some(&search)).unwrap();
        assert_eq!(found, dir.path().join("rg"));
    }

    #[test]
    fn path_scan_honors_directory_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch_exec(&first.path().join("rg"));
        touch_exec(&second.path().join("rg"));
        let search = env::join_paths([first.path(), second.path()]).unwrap();
        let found = discover_binary(None, Some(&search)).unwrap();
        assert_eq!(found, first.path().join("rg"));
    }

    #[cfg(unix)]
    #[test]
    fn discovery_skips_files_without_exec_bit() {
        let plain = tempfile::tempdir().unwrap();
        let exec = tempfile::tempdir().unwrap();
        fs::write(plain.path().join("rg"), "").unwrap();
        touch_exec(&exec.path().join("rg"));
        let search = env::join_paths([plain.path(), exec.path()]).unwrap();

        let found = discover_binary(None, Some(&search)).unwrap();
        assert_eq!(found, exec.path().join("rg"));

        // A non-executable override is rejected the same way.
        let ignored = plain.path().join("rg");
        let found = discover_binary(Some(ignored.as_os_str()), Some(&search)).unwrap();
        assert_eq!(found, exec.path().join("rg"));
    }

    #[test]
    fn nothing_anywhere_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let search = env::join_paths([dir.path()]).unwrap();
        assert!(discover_binary(None, Some(&search)).is_none());
        assert!(discover_binary(None, None).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn version_probe_reads_first_line() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("rg");
        fs::write(&script, "#!/bin/sh\necho 'ripgrep 14.1.0'\necho 'extra'\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(probe_version(&script).as_deref(), Some("ripgrep 14.1.0"));
    }
}
