//! Problem list
//!
//! Ordered collection of diagnostics recognized in tool output. The list
//! owns the parser set and an optional activation callback used by a UI to
//! jump to a diagnostic's location. It lives on the owner thread; producer
//! threads reach it only indirectly through sinks.

use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::parser::DiagnosticParser;

/// Invoked with `(file, line, column)` when a row is activated
pub type ActivateCallback = Box<dyn Fn(&str, u32, u32) + Send>;

/// Insertion-ordered diagnostic collection
pub struct ProblemList {
    items: Vec<Diagnostic>,
    parsers: Vec<DiagnosticParser>,
    on_activate: Option<ActivateCallback>,
}

impl Default for ProblemList {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemList {
    /// List with the full default parser set
    #[must_use]
    pub fn new() -> Self {
        Self::with_parsers(DiagnosticParser::default_set())
    }

    /// List recognizing only the given formats, tried in order
    #[must_use]
    pub fn with_parsers(parsers: Vec<DiagnosticParser>) -> Self {
        Self {
            items: Vec::new(),
            parsers,
            on_activate: None,
        }
    }

    pub fn add(&mut self, diag: Diagnostic) {
        self.items.push(diag);
    }

    /// Drop every item, returning how many there were
    ///
    /// The parser set and activation callback survive.
    pub fn clear(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();
        if count > 0 {
            debug!(count, "problem list cleared");
        }
        count
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
    pub fn get(&self, index: usize) -> Option<&Diagnostic> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Rows for display: 1-based index plus the diagnostic
    pub fn rows(&self) -> impl Iterator<Item = (usize, &Diagnostic)> {
        self.items.iter().enumerate().map(|(i, d)| (i + 1, d))
    }

    /// Try every parser against `line`; append on the first match
    ///
    /// Returns whether a diagnostic was added. Unmatched lines leave the
    /// list untouched.
    pub fn parse_any(&mut self, line: &str) -> bool {
        for parser in &self.parsers {
            if let Some(diag) = parser.feed_line(line) {
                self.items.push(diag);
                return true;
            }
        }
        false
    }

    pub fn set_on_activate(&mut self, callback: ActivateCallback) {
        self.on_activate = Some(callback);
    }

    /// Fire the activation callback for row `index` (0-based)
    ///
    /// Returns false when the index is out of range or no callback is set.
    pub fn activate(&self, index: usize) -> bool {
        let (Some(diag), Some(callback)) = (self.items.get(index), self.on_activate.as_ref())
        else {
            return false;
        };
        callback(&diag.file, diag.line, diag.column);
        true
    }
}
