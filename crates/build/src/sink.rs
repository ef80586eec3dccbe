//! Output sinks
//!
//! A sink receives the text and diagnostics produced by running processes.
//! The trait keeps the pipeline decoupled from any particular console: the
//! same runner can feed a terminal widget, a log buffer, or a test harness.

use std::fmt::Write as _;
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::diagnostic::Diagnostic;

/// Receiver for process output
///
/// All methods have defaults so implementors only override what they care
/// about. `emit_err_line` falls back to `emit_line`, so a sink that does not
/// distinguish streams still sees every line. `emit_diag` renders the
/// diagnostic as text by default.
pub trait OutputSink: Send + Sync {
    /// One line of standard output, terminator already stripped
    fn emit_line(&self, line: &str) {
        let _ = line;
    }

    /// One line of standard error, terminator already stripped
    fn emit_err_line(&self, line: &str) {
        self.emit_line(line);
    }

    /// A structured diagnostic recognized in the output
    fn emit_diag(&self, diag: &Diagnostic) {
        let mut text = String::new();
        let _ = write!(text, "{diag}");
        self.emit_line(&text);
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {}

/// Sink backed by a closure, one call per line
pub struct FnSink<F>
where
    F: Fn(&str) + Send + Sync,
{
    f: F,
}

impl<F> FnSink<F>
where
    F: Fn(&str) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> OutputSink for FnSink<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn emit_line(&self, line: &str) {
        (self.f)(line);
    }
}

/// Wrap a line closure as a shareable sink
pub fn sink_from_line_fn<F>(f: F) -> Arc<dyn OutputSink>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    Arc::new(FnSink::new(f))
}

/// Sink that accumulates lines in memory, mainly for tests
///
/// Stderr lines are recorded with an `[err] ` tag so interleaving stays
/// visible after the fact.
#[derive(Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Number of lines received
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl OutputSink for BufferSink {
    fn emit_line(&self, line: &str) {
        self.lines.lock().push(line.to_owned());
    }

    fn emit_err_line(&self, line: &str) {
        self.lines.lock().push(format!("[err] {line}"));
    }
}

/// Sink that forwards lines over a channel
///
/// Useful when the consumer lives on another thread, e.g. a UI event loop.
/// Send failures are ignored; a dropped receiver just means nobody is
/// listening anymore.
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl OutputSink for ChannelSink {
    fn emit_line(&self, line: &str) {
        let _ = self.tx.send(line.to_owned());
    }

    fn emit_err_line(&self, line: &str) {
        let _ = self.tx.send(format!("[err] {line}"));
    }
}
