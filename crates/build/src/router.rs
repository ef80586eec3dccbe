//! Problem router
//!
//! Fan-out point between a running tool and its consumers. Each output line
//! is offered to the parser set: recognized lines become diagnostics in the
//! [`ProblemList`] and reach the sink in structured form; everything else is
//! forwarded verbatim. `begin`/`end` bracket one tool invocation.

use std::sync::Arc;

use crate::problems::ProblemList;
use crate::sink::OutputSink;

pub struct ProblemRouter {
    list: ProblemList,
    sink: Arc<dyn OutputSink>,
}

impl ProblemRouter {
    #[must_use]
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self::with_list(ProblemList::new(), sink)
    }

    /// Router over a caller-prepared list (custom parser set or callback)
    #[must_use]
    pub fn with_list(list: ProblemList, sink: Arc<dyn OutputSink>) -> Self {
        Self { list, sink }
    }

    /// Start a routing session: clear stale diagnostics, announce on the sink
    pub fn begin(&mut self) {
        self.list.clear();
        self.sink.emit_line("[problems] started");
    }

    /// Route one line; returns whether it parsed as a diagnostic
    ///
    /// A recognized line is appended to the list and delivered through
    /// `emit_diag`; its raw text is not echoed. Unrecognized lines pass
    /// through `emit_line` untouched.
    pub fn feed(&mut self, line: &str) -> bool {
        if self.list.parse_any(line) {
            if let Some(diag) = self.list.get(self.list.len() - 1) {
                self.sink.emit_diag(diag);
            }
            true
        } else {
            self.sink.emit_line(line);
            false
        }
    }

    /// Close the session
    // TODO: fold per-severity counts into the done banner.
    pub fn end(&self) {
        self.sink.emit_line("[problems] done");
    }

    #[must_use]
    pub fn problems(&self) -> &ProblemList {
        &self.list
    }

    pub fn problems_mut(&mut self) -> &mut ProblemList {
        &mut self.list
    }

    #[must_use]
    pub fn sink(&self) -> Arc<dyn OutputSink> {
        Arc::clone(&self.sink)
    }
}
