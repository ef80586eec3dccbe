//! Process supervision
//!
//! [`ProcessRunner`] spawns one child process at a time, streams its output
//! line by line into an [`OutputSink`], and reports the exit code through a
//! one-shot callback. Output is read on dedicated threads so a chatty child
//! never blocks the caller; a third thread reaps the child after both
//! streams close.
//!
//! Line splitting understands `\n`, `\r\n`, and bare `\r` terminators, so
//! output from Unix and Windows tools looks the same downstream. A final
//! unterminated line is still delivered.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{BuildError, Result};
use crate::sink::OutputSink;

/// Invoked exactly once with the child's exit code (-1 when killed or
/// unavailable).
pub type ExitCallback = Box<dyn FnOnce(i32) + Send + 'static>;

const REAP_POLL: Duration = Duration::from_millis(10);

/// Everything needed to launch a child process
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    /// Executable name or path
    pub program: String,
    /// Arguments, not including the program itself
    pub args: Vec<String>,
    /// Working directory; `None` inherits the parent's
    pub cwd: Option<PathBuf>,
    /// Full replacement environment as `KEY=VALUE` pairs (entries without
    /// `=` are skipped); `None` inherits the parent's environment
    pub env: Option<Vec<String>>,
    /// Route stderr lines through `emit_line` instead of `emit_err_line`
    pub merge_stderr: bool,
}

impl SpawnSpec {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: None,
            merge_stderr: false,
        }
    }

    /// Build from a full argv where the first element is the program
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| BuildError::invalid_argument("empty command line"))?;
        if program.is_empty() {
            return Err(BuildError::invalid_argument("empty program name"));
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: None,
            env: None,
            merge_stderr: false,
        })
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    pub fn env_pairs(mut self, pairs: Vec<String>) -> Self {
        self.env = Some(pairs);
        self
    }

    #[must_use]
    pub fn merge_stderr(mut self, merge: bool) -> Self {
        self.merge_stderr = merge;
        self
    }
}

/// Lifecycle of the supervised child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// No child, ready to spawn
    Idle,
    /// Child alive and streaming
    Running,
    /// Stop requested, waiting for the child to die
    Terminating,
}

#[derive(Clone, Copy)]
enum StreamKind {
    Stdout,
    Stderr,
}

struct Shared {
    sink: Arc<dyn OutputSink>,
    cancel: AtomicBool,
    running: AtomicBool,
    child: Mutex<Option<Child>>,
}

impl Shared {
    fn deliver(&self, kind: StreamKind, line: &str) {
        match kind {
            StreamKind::Stdout => self.sink.emit_line(line),
            StreamKind::Stderr => self.sink.emit_err_line(line),
        }
    }
}

/// Supervises at most one child process
///
/// `run` rejects a second spawn while a child is alive. After the child
/// exits the runner returns to [`RunnerState::Idle`] and can be reused.
pub struct ProcessRunner {
    shared: Arc<Shared>,
    waiter: Option<JoinHandle<()>>,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                sink,
                cancel: AtomicBool::new(false),
                running: AtomicBool::new(false),
                child: Mutex::new(None),
            }),
            waiter: None,
        }
    }

    /// Spawn `spec` and start streaming its output
    ///
    /// Fails with [`BuildError::AlreadyRunning`] while a child is alive and
    /// with [`BuildError::SpawnFailed`] when the program cannot start; the
    /// exit callback is not invoked in either case.
    pub fn run(&mut self, spec: &SpawnSpec, on_exit: Option<ExitCallback>) -> Result<()> {
        if self.shared.running.load(Ordering::SeqCst) {
            return Err(BuildError::AlreadyRunning);
        }
        if spec.program.is_empty() {
            return Err(BuildError::invalid_argument("empty program name"));
        }
        // Detach the previous waiter; the thread cleans up after itself.
        let _ = self.waiter.take();

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        if let Some(pairs) = &spec.env {
            cmd.env_clear();
            for pair in pairs {
                if let Some((key, value)) = pair.split_once('=') {
                    cmd.env(key, value);
                }
            }
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| BuildError::spawn_failed(&spec.program, e))?;
        debug!(program = %spec.program, "child spawned");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Publish the child before flipping `running` so a concurrent stop
        // that observes the flag always finds something to kill.
        self.shared.cancel.store(false, Ordering::SeqCst);
        *self.shared.child.lock() = Some(child);
        self.shared.running.store(true, Ordering::SeqCst);

        let out_reader = stdout.map(|pipe| {
            let shared = Arc::clone(&self.shared);
            thread::spawn(move || pump_stream(pipe, &shared, StreamKind::Stdout))
        });
        let err_kind = if spec.merge_stderr {
            StreamKind::Stdout
        } else {
            StreamKind::Stderr
        };
        let err_reader = stderr.map(|pipe| {
            let shared = Arc::clone(&self.shared);
            thread::spawn(move || pump_stream(pipe, &shared, err_kind))
        });

        let shared = Arc::clone(&self.shared);
        self.waiter = Some(thread::spawn(move || {
            if let Some(handle) = out_reader {
                let _ = handle.join();
            }
            if let Some(handle) = err_reader {
                let _ = handle.join();
            }
            let code = reap(&shared);
            shared.running.store(false, Ordering::SeqCst);
            debug!(code, "child exited");
            if let Some(callback) = on_exit {
                callback(code);
            }
        }));

        Ok(())
    }

    /// Ask the running child to die
    ///
    /// Kills the process and announces `[runner] stop requested` on the
    /// sink. No-op when idle or when a stop is already in flight. The exit
    /// callback still fires once the child is reaped, normally with code -1.
    pub fn stop(&self) {
        if !self.shared.running.load(Ordering::SeqCst) {
            return;
        }
        if self.shared.cancel.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(child) = self.shared.child.lock().as_mut() {
            if let Err(err) = child.kill() {
                debug!(%err, "kill failed, child may have already exited");
            }
        }
        self.shared.sink.emit_line("[runner] stop requested");
    }

    /// Block until the current child (if any) has exited and its callback
    /// has run
    pub fn wait(&mut self) {
        if let Some(handle) = self.waiter.take() {
            let _ = handle.join();
        }
    }

    #[must_use]
    pub fn state(&self) -> RunnerState {
        if !self.shared.running.load(Ordering::SeqCst) {
            RunnerState::Idle
        } else if self.shared.cancel.load(Ordering::SeqCst) {
            RunnerState::Terminating
        } else {
            RunnerState::Running
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        // Kill a still-running child but never join the waiter here: the
        // runner may be dropped from inside the waiter's own exit callback.
        if self.shared.running.load(Ordering::SeqCst) {
            self.stop();
        }
    }
}

/// Poll the child until it exits
///
/// The slot lock is held only across each non-blocking `try_wait`, never
/// while sleeping, so a concurrent [`ProcessRunner::stop`] can always take
/// it and deliver the kill. A child that closes its pipes but keeps running
/// would otherwise pin the lock here until it died on its own.
fn reap(shared: &Shared) -> i32 {
    loop {
        let mut slot = shared.child.lock();
        let Some(child) = slot.as_mut() else {
            return -1;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                *slot = None;
                return status.code().unwrap_or(-1);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(%err, "failed to reap child");
                *slot = None;
                return -1;
            }
        }
        drop(slot);
        thread::sleep(REAP_POLL);
    }
}

fn pump_stream<R: Read>(pipe: R, shared: &Shared, kind: StreamKind) {
    let mut deliver = |line: &str| shared.deliver(kind, line);
    if let Err(err) = split_lines(pipe, &mut deliver) {
        warn!(%err, "child stream read failed");
        shared.deliver(kind, &format!("[runner] stream read failed: {err}"));
    }
}

/// Split a byte stream into lines
///
/// Handles `\n`, `\r\n`, and bare `\r`, including a CRLF pair straddling
/// two reads. Empty lines are delivered, as is a final unterminated line.
/// Invalid UTF-8 is replaced, not dropped.
fn split_lines<R: Read>(mut pipe: R, deliver: &mut dyn FnMut(&str)) -> std::io::Result<()> {
    let mut buf = [0u8; 4096];
    let mut acc: Vec<u8> = Vec::new();
    let mut skip_lf = false;
    loop {
        let n = match pipe.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                if !acc.is_empty() {
                    flush_line(&mut acc, deliver);
                }
                return Err(err);
            }
        };
        for &byte in &buf[..n] {
            if skip_lf {
                skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => flush_line(&mut acc, deliver),
                b'\r' => {
                    flush_line(&mut acc, deliver);
                    skip_lf = true;
                }
                _ => acc.push(byte),
            }
        }
    }
    if !acc.is_empty() {
        flush_line(&mut acc, deliver);
    }
    Ok(())
}

fn flush_line(acc: &mut Vec<u8>, deliver: &mut dyn FnMut(&str)) {
    let line = String::from_utf8_lossy(acc);
    deliver(&line);
    acc.clear();
}
