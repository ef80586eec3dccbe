//! Build system detection
//!
//! Inspect a project root for well-known build files and pick the matching
//! command set. Detection is deliberately shallow: only the root directory
//! is probed, and the first match wins.

use std::path::Path;

use tracing::debug;

/// Host platform flavor, split out so both command tables stay testable
/// from any host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// Recognized build tool families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildSystemKind {
    Ninja,
    Make,
    MsBuild,
    Custom,
}

impl BuildSystemKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildSystemKind::Ninja => "ninja",
            BuildSystemKind::Make => "make",
            BuildSystemKind::MsBuild => "msbuild",
            BuildSystemKind::Custom => "custom",
        }
    }
}

/// Shell command lines for the three standard actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommands {
    pub build: String,
    pub run: String,
    pub test: String,
}

impl BuildCommands {
    fn new(build: &str, run: &str, test: &str) -> Self {
        Self {
            build: build.to_owned(),
            run: run.to_owned(),
            test: test.to_owned(),
        }
    }
}

/// A detected build system with its default commands
#[derive(Debug, Clone)]
pub struct BuildSystem {
    kind: BuildSystemKind,
    commands: BuildCommands,
}

impl BuildSystem {
    /// Probe `root` for build files and pick the command set for the
    /// current platform
    #[must_use]
    pub fn detect(root: &Path) -> Self {
        Self::detect_on(root, Platform::current())
    }

    /// Same as [`detect`](Self::detect) with the platform pinned
    #[must_use]
    pub fn detect_on(root: &Path, platform: Platform) -> Self {
        let kind = if root.join("build.ninja").exists() {
            BuildSystemKind::Ninja
        } else if root.join("Makefile").exists() {
            BuildSystemKind::Make
        } else {
            match platform {
                Platform::Windows => BuildSystemKind::MsBuild,
                Platform::Posix => BuildSystemKind::Custom,
            }
        };
        debug!(root = %root.display(), kind = kind.as_str(), "build system detected");
        Self {
            kind,
            commands: commands_for(kind, platform),
        }
    }

    #[must_use]
    pub fn kind(&self) -> BuildSystemKind {
        self.kind
    }

    #[must_use]
    pub fn commands(&self) -> &BuildCommands {
        &self.commands
    }

    /// Override the command strings; the detected tool is unchanged
    pub fn set_commands(&mut self, build: &str, run: &str, test: &str) {
        self.commands = BuildCommands::new(build, run, test);
    }

    /// Build action as an argv, ready to spawn
    #[must_use]
    pub fn build_argv(&self) -> Vec<String> {
        split_command(&self.commands.build)
    }

    #[must_use]
    pub fn run_argv(&self) -> Vec<String> {
        split_command(&self.commands.run)
    }

    #[must_use]
    pub fn test_argv(&self) -> Vec<String> {
        split_command(&self.commands.test)
    }
}

/// Default command table per build system and platform
#[must_use]
pub fn commands_for(kind: BuildSystemKind, platform: Platform) -> BuildCommands {
    match (kind, platform) {
        (BuildSystemKind::Ninja, _) => BuildCommands::new("ninja", "ninja run", "ninja test"),
        (BuildSystemKind::Make, Platform::Windows) => {
            BuildCommands::new("mingw32-make -j", "mingw32-make run", "mingw32-make test")
        }
        (BuildSystemKind::Make, Platform::Posix) => {
            BuildCommands::new("make -j", "make run", "make test")
        }
        (BuildSystemKind::MsBuild, _) => BuildCommands::new("msbuild /m", "build\\app.exe", "ctest"),
        (BuildSystemKind::Custom, _) => BuildCommands::new("sh -lc 'echo build'", "./app", "ctest"),
    }
}

/// Split a shell-ish command line into an argv
///
/// Never returns an empty vector: unsplittable or empty input falls back
/// to `["true"]` so a spawn attempt stays well-formed.
#[must_use]
pub fn split_command(command: &str) -> Vec<String> {
    match shlex::split(command) {
        Some(argv) if !argv.is_empty() => argv,
        _ => vec!["true".to_owned()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn ninja_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("build.ninja"), "rule cc\n").unwrap();
        let sys = BuildSystem::detect(dir.path());
        assert_eq!(sys.kind(), BuildSystemKind::Ninja);
        assert_eq!(sys.commands().build, "ninja");
        assert_eq!(sys.build_argv(), vec!["ninja"]);
    }

    #[test]
    fn ninja_takes_precedence_over_make() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("build.ninja"), "").unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        let sys = BuildSystem::detect(dir.path());
        assert_eq!(sys.kind(), BuildSystemKind::Ninja);
    }

    #[test]
    fn makefile_selects_make() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        let posix = BuildSystem::detect_on(dir.path(), Platform::Posix);
        assert_eq!(posix.kind(), BuildSystemKind::Make);
        assert_eq!(posix.commands().build, "make -j");
        let windows = BuildSystem::detect_on(dir.path(), Platform::Windows);
        assert_eq!(windows.commands().build, "mingw32-make -j");
        assert_eq!(windows.commands().test, "mingw32-make test");
    }

    #[test]
    fn empty_dir_falls_back_per_platform() {
        let dir = tempfile::tempdir().unwrap();
        let posix = BuildSystem::detect_on(dir.path(), Platform::Posix);
        assert_eq!(posix.kind(), BuildSystemKind::Custom);
        assert_eq!(posix.commands().build, "sh -lc 'echo build'");
        assert_eq!(posix.commands().run, "./app");
        let windows = BuildSystem::detect_on(dir.path(), Platform::Windows);
        assert_eq!(windows.kind(), BuildSystemKind::MsBuild);
        assert_eq!(windows.commands().build, "msbuild /m");
        assert_eq!(windows.commands().run, "build\\app.exe");
    }

    #[test]
    fn detect_uses_current_platform_default() {
        let dir = tempfile::tempdir().unwrap();
        let sys = BuildSystem::detect(dir.path());
        if cfg!(windows) {
            assert_eq!(sys.kind(), BuildSystemKind::MsBuild);
        } else {
            assert_eq!(sys.kind(), BuildSystemKind::Custom);
        }
    }

    #[test]
    fn set_commands_keeps_tool() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("build.ninja"), "").unwrap();
        let mut sys = BuildSystem::detect(dir.path());
        sys.set_commands("ninja -C out", "out/app", "ctest --output-on-failure");
        assert_eq!(sys.kind(), BuildSystemKind::Ninja);
        assert_eq!(sys.build_argv(), vec!["ninja", "-C", "out"]);
        assert_eq!(sys.test_argv(), vec!["ctest", "--output-on-failure"]);
    }

    #[test]
    fn detect_twice_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        let a = BuildSystem::detect_on(dir.path(), Platform::Posix);
        let b = BuildSystem::detect_on(dir.path(), Platform::Posix);
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.commands(), b.commands());
    }

    #[test]
    fn split_command_respects_quotes() {
        assert_eq!(
            split_command("sh -lc 'echo build'"),
            vec!["sh", "-lc", "echo build"]
        );
    }

    #[test]
    fn split_command_never_empty() {
        assert_eq!(split_command(""), vec!["true"]);
        assert_eq!(split_command("   "), vec!["true"]);
        // Unbalanced quote fails to lex and falls back too.
        assert_eq!(split_command("don't"), vec!["true"]);
    }
}
