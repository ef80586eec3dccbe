//! Structured compiler/tool diagnostics
//!
//! One `Diagnostic` describes one message from an external tool: severity,
//! optional file location, and the message text. Instances are produced by
//! the parser and owned by the problem list after insertion.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Definite problem that must be fixed
    Error,
    /// Potential issue that should be reviewed
    Warning,
    /// Follow-up or context message
    Note,
}

impl Severity {
    /// Returns the string representation of the severity
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }

    /// Stable integer encoding used in logs
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::Note => 2,
        }
    }

    /// Map a severity token from tool output (case-insensitive, prefix match).
    ///
    /// `warning…` maps to Warning and `note…` to Note; everything else,
    /// including `error` and `fatal error`, maps to Error.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let t = token.trim();
        if starts_with_ignore_case(t, "warning") {
            Severity::Warning
        } else if starts_with_ignore_case(t, "note") {
            Severity::Note
        } else {
            Severity::Error
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    // Byte-wise so a multi-byte character at the boundary cannot panic.
    let (s, prefix) = (s.as_bytes(), prefix.as_bytes());
    s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// One structured tool message
///
/// `file` may be empty when the tool gave no location. `line` and `column`
/// are 1-based; 0 denotes unknown, and an unknown line forces an unknown
/// column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// File path, empty when unknown
    pub file: String,
    /// Line number (1-based, 0 = unknown)
    pub line: u32,
    /// Column number (1-based, 0 = unknown)
    pub column: u32,
    /// Message text, single line
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with a full location
    pub fn new(
        severity: Severity,
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        // An unknown line cannot carry a column.
        let column = if line == 0 { 0 } else { column };
        Self {
            severity,
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an error diagnostic
    pub fn error(file: impl Into<String>, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, file, line, column, message)
    }

    /// Create a warning diagnostic
    pub fn warning(
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, file, line, column, message)
    }

    /// Create a bare note without a location
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, "", 0, 0, message)
    }

    /// Whether the diagnostic carries any file location
    #[must_use]
    pub fn has_location(&self) -> bool {
        !self.file.is_empty() || self.line > 0
    }

    /// Format the location (e.g. "main.c:10:5", "main.c:10", "main.c", "")
    #[must_use]
    pub fn location_string(&self) -> String {
        match (self.file.is_empty(), self.line, self.column) {
            (false, 0, _) => self.file.clone(),
            (false, line, 0) => format!("{}:{}", self.file, line),
            (false, line, col) => format!("{}:{}:{}", self.file, line, col),
            (true, 0, _) => String::new(),
            (true, line, 0) => format!("{line}"),
            (true, line, col) => format!("{line}:{col}"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = self.location_string();
        if loc.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{} {}: {}", self.severity, loc, self.message)
        }
    }
}
