//! Build tasks façade
//!
//! One object per project root tying detection and supervision together:
//! detect the build system once, then expose `build`/`run_target`/`test`
//! that spawn the matching command with the root as working directory.
//! Output and exit codes travel through the sink and the per-call
//! callback; the façade itself stays synchronous.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::detect::BuildSystem;
use crate::error::{BuildError, Result};
use crate::runner::{ExitCallback, ProcessRunner, SpawnSpec};
use crate::sink::OutputSink;

pub struct BuildTasks {
    root: PathBuf,
    system: BuildSystem,
    runner: ProcessRunner,
}

impl BuildTasks {
    /// Detect the build system under `root` and prepare a runner
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, sink: Arc<dyn OutputSink>) -> Self {
        let root = root.into();
        let system = BuildSystem::detect(&root);
        Self {
            root,
            system,
            runner: ProcessRunner::new(sink),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn build_system(&self) -> &BuildSystem {
        &self.system
    }

    /// Mutable access, mainly for command overrides
    pub fn build_system_mut(&mut self) -> &mut BuildSystem {
        &mut self.system
    }

    /// Swap the sink used by subsequent runs
    ///
    /// Rejected while a child is alive; the live run keeps its sink.
    pub fn set_sink(&mut self, sink: Arc<dyn OutputSink>) -> Result<()> {
        if self.runner.is_running() {
            return Err(BuildError::AlreadyRunning);
        }
        self.runner = ProcessRunner::new(sink);
        Ok(())
    }

    /// Spawn the build command
    pub fn build(&mut self, on_exit: Option<ExitCallback>) -> Result<()> {
        self.spawn("build", self.system.build_argv(), on_exit)
    }

    /// Spawn the run command
    pub fn run_target(&mut self, on_exit: Option<ExitCallback>) -> Result<()> {
        self.spawn("run", self.system.run_argv(), on_exit)
    }

    /// Spawn the test command
    pub fn test(&mut self, on_exit: Option<ExitCallback>) -> Result<()> {
        self.spawn("test", self.system.test_argv(), on_exit)
    }

    /// Cancel the active child, if any
    pub fn stop(&self) {
        self.runner.stop();
    }

    /// Block until the active run (if any) has fully finished
    pub fn wait(&mut self) {
        self.runner.wait();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    fn spawn(&mut self, action: &str, argv: Vec<String>, on_exit: Option<ExitCallback>) -> Result<()> {
        let spec = SpawnSpec::from_argv(&argv)?.current_dir(&self.root);
        info!(action, program = %spec.program, root = %self.root.display(), "task started");
        self.runner.run(&spec, on_exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BuildSystemKind;
    use crate::sink::BufferSink;
    use std::fs;

    fn tasks_in(dir: &Path) -> (BuildTasks, Arc<BufferSink>) {
        let sink = Arc::new(BufferSink::new());
        let tasks = BuildTasks::new(dir, Arc::clone(&sink) as Arc<dyn OutputSink>);
        (tasks, sink)
    }

    #[test]
    fn detects_once_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("build.ninja"), "").unwrap();
        let (tasks, _sink) = tasks_in(dir.path());
        assert_eq!(tasks.build_system().kind(), BuildSystemKind::Ninja);
        assert_eq!(tasks.root(), dir.path());
    }

    #[cfg(unix)]
    #[test]
    fn build_runs_overridden_command_in_root() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tasks, sink) = tasks_in(dir.path());
        tasks
            .build_system_mut()
            .set_commands("echo built-ok", "echo ran", "echo tested");
        let (tx, rx) = crossbeam_channel::bounded(1);
        tasks
            .build(Some(Box::new(move |code| {
                let _ = tx.send(code);
            })))
            .unwrap();
        tasks.wait();
        assert_eq!(rx.recv().unwrap(), 0);
        assert!(sink.lines().contains(&"built-ok".to_owned()));
        assert!(!tasks.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn second_spawn_while_running_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tasks, _sink) = tasks_in(dir.path());
        tasks
            .build_system_mut()
            .set_commands("sleep 5", "sleep 5", "sleep 5");
        tasks.build(None).unwrap();
        assert!(matches!(tasks.test(None), Err(BuildError::AlreadyRunning)));
        assert!(matches!(
            tasks.set_sink(Arc::new(BufferSink::new())),
            Err(BuildError::AlreadyRunning)
        ));
        tasks.stop();
        tasks.wait();
    }

    #[cfg(unix)]
    #[test]
    fn set_sink_redirects_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tasks, first) = tasks_in(dir.path());
        tasks
            .build_system_mut()
            .set_commands("echo one", "echo two", "echo three");
        let second = Arc::new(BufferSink::new());
        tasks
            .set_sink(Arc::clone(&second) as Arc<dyn OutputSink>)
            .unwrap();
        tasks.run_target(None).unwrap();
        tasks.wait();
        assert!(first.is_empty());
        assert!(second.lines().contains(&"two".to_owned()));
    }
}
