//! Build queue
//!
//! FIFO of pending tool invocations with at most one child alive. `push`
//! only records; an explicit `start` begins draining, and each job's exit
//! callback pumps the next one. Jobs therefore run strictly in push order
//! with no overlap.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::runner::{ExitCallback, ProcessRunner, SpawnSpec};
use crate::sink::OutputSink;

struct Job {
    cwd: Option<PathBuf>,
    argv: Vec<String>,
}

struct QueueInner {
    jobs: VecDeque<Job>,
    running: bool,
    runner: Option<ProcessRunner>,
}

/// Serializes build jobs onto one runner slot
pub struct BuildQueue {
    inner: Arc<Mutex<QueueInner>>,
    sink: Arc<dyn OutputSink>,
}

impl BuildQueue {
    #[must_use]
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner {
                jobs: VecDeque::new(),
                running: false,
                runner: None,
            })),
            sink,
        }
    }

    /// Append a job without starting it
    ///
    /// The argv is copied; an empty argv becomes the no-op `["true"]` so
    /// the eventual spawn stays well-formed.
    pub fn push(&self, cwd: Option<&Path>, argv: &[String]) {
        let argv = if argv.is_empty() {
            vec!["true".to_owned()]
        } else {
            argv.to_vec()
        };
        let pending = {
            let mut guard = self.inner.lock();
            guard.jobs.push_back(Job {
                cwd: cwd.map(Path::to_path_buf),
                argv,
            });
            guard.jobs.len()
        };
        debug!(pending, "job enqueued");
        self.sink.emit_line("[queue] job enqueued");
    }

    /// Begin draining
    ///
    /// Returns true when a job is now running (or one already was), false
    /// when the queue is empty or the front job failed to spawn. A failed
    /// spawn leaves the remaining jobs queued for the next `start`.
    pub fn start(&self) -> bool {
        pump(&self.inner, &self.sink)
    }

    /// Cancel the active job and drop everything pending
    pub fn stop(&self) {
        let mut guard = self.inner.lock();
        let dropped = guard.jobs.len();
        guard.jobs.clear();
        if dropped > 0 {
            debug!(dropped, "pending jobs dropped");
        }
        if let Some(runner) = guard.runner.as_ref() {
            runner.stop();
        }
    }

    /// Number of jobs waiting (not counting the active one)
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    /// Whether a job is currently being drained
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.lock().running
    }

    #[cfg(test)]
    fn front_argv(&self) -> Option<Vec<String>> {
        self.inner.lock().jobs.front().map(|j| j.argv.clone())
    }
}

impl Drop for BuildQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Pop and spawn the next job; also the exit-callback re-entry point.
/// The lock is held across pop and spawn so only one caller can win.
fn pump(inner: &Arc<Mutex<QueueInner>>, sink: &Arc<dyn OutputSink>) -> bool {
    let mut guard = inner.lock();
    if guard.running {
        return true;
    }
    let Some(job) = guard.jobs.pop_front() else {
        if guard.runner.take().is_some() {
            debug!("queue drained");
        }
        return false;
    };

    let spec = match SpawnSpec::from_argv(&job.argv) {
        Ok(spec) => match job.cwd {
            Some(cwd) => spec.current_dir(cwd),
            None => spec,
        },
        Err(err) => {
            sink.emit_err_line(&format!("queue job rejected: {err}"));
            return false;
        }
    };

    let mut runner = ProcessRunner::new(Arc::clone(sink));
    let inner2 = Arc::clone(inner);
    let sink2 = Arc::clone(sink);
    let on_exit: ExitCallback = Box::new(move |code| {
        debug!(code, "queue job finished");
        sink2.emit_line("[queue] job finished");
        inner2.lock().running = false;
        let _ = pump(&inner2, &sink2);
    });

    match runner.run(&spec, Some(on_exit)) {
        Ok(()) => {
            guard.runner = Some(runner);
            guard.running = true;
            true
        }
        Err(err) => {
            warn!(%err, program = %spec.program, "queued job spawn failed");
            sink.emit_err_line(&format!("failed to start queued job: {err}"));
            guard.runner = None;
            false
        }
    }
}
