//! Diagnostic line parsing
//!
//! Heuristically parse one line of tool output into a [`Diagnostic`].
//! Three families are recognized, tried in order of specificity:
//!
//! - GCC/Clang: `src/foo.c:10:7: warning: unused variable 'x'`
//! - MSVC: `C:\proj\src\foo.c(10,7): error C1234: something bad`
//! - Generic note: `note: previous declaration is here`
//!
//! Parsing is conservative: when a line does not match with confidence the
//! caller treats it as plain output. Regexes are compiled once and shared.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostic::{Diagnostic, Severity};

/// Recognized diagnostic line formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    /// `file:line[:col]: severity: message`
    GccLike,
    /// `file(line[,col]): severity [CODE]: message`
    MsvcLike,
    /// Bare `note: message` follow-up lines
    GenericNote,
}

impl ParserKind {
    /// Short identifier used in logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::GccLike => "gcc/clang",
            ParserKind::MsvcLike => "msvc",
            ParserKind::GenericNote => "note",
        }
    }
}

#[allow(clippy::expect_used)]
static GCC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?):(\d+)(?::(\d+))?\s*:\s*([A-Za-z ]+?)\s*:\s*(.*)$").expect("static pattern")
});

#[allow(clippy::expect_used)]
static MSVC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\((\d+)(?:,(\d+))?\)\s*:\s*([A-Za-z ]+?)\s+[A-Za-z]?\d*\s*:\s*(.*)$")
        .expect("static pattern")
});

/// Single-format line parser
///
/// Stateless across lines; owns nothing but its family tag. A set covering
/// all families in match order comes from [`DiagnosticParser::default_set`].
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticParser {
    kind: ParserKind,
}

impl DiagnosticParser {
    /// Create a parser for one format family
    #[must_use]
    pub fn new(kind: ParserKind) -> Self {
        Self { kind }
    }

    /// The family this parser recognizes
    #[must_use]
    pub fn kind(&self) -> ParserKind {
        self.kind
    }

    /// All families in the order they should be tried
    #[must_use]
    pub fn default_set() -> Vec<DiagnosticParser> {
        vec![
            DiagnosticParser::new(ParserKind::GccLike),
            DiagnosticParser::new(ParserKind::MsvcLike),
            DiagnosticParser::new(ParserKind::GenericNote),
        ]
    }

    /// Try to parse one line. Returns `None` when the line does not match.
    ///
    /// The line is stripped of trailing CR/LF before matching; the message
    /// is trimmed of surrounding whitespace. A positional match whose line
    /// number reads as 0 is rejected.
    #[must_use]
    pub fn feed_line(&self, line: &str) -> Option<Diagnostic> {
        let line = line.trim_end_matches(['\r', '\n']);
        match self.kind {
            ParserKind::GccLike => parse_positional(&GCC_RE, line),
            ParserKind::MsvcLike => parse_positional(&MSVC_RE, line),
            ParserKind::GenericNote => parse_note(line),
        }
    }
}

/// Shared logic for the two positional families: captures are
/// (file, line, col?, severity token, message).
fn parse_positional(re: &Regex, line: &str) -> Option<Diagnostic> {
    let caps = re.captures(line)?;
    let file = caps.get(1).map_or("", |m| m.as_str());
    if file.is_empty() {
        return None;
    }
    let lineno = parse_u32(caps.get(2).map_or("", |m| m.as_str()));
    if lineno == 0 {
        return None;
    }
    let col = caps.get(3).map_or(0, |m| parse_u32(m.as_str()));
    let severity = Severity::from_token(caps.get(4).map_or("", |m| m.as_str()));
    let message = caps.get(5).map_or("", |m| m.as_str()).trim();
    if message.is_empty() {
        return None;
    }
    Some(Diagnostic::new(severity, file, lineno, col, message))
}

fn parse_note(line: &str) -> Option<Diagnostic> {
    let rest = line.trim_start();
    // Byte-wise prefix test; a multi-byte character at index 5 must not panic.
    let bytes = rest.as_bytes();
    if bytes.len() < 5 || !bytes[..5].eq_ignore_ascii_case(b"note:") {
        return None;
    }
    let message = rest[5..].trim();
    if message.is_empty() {
        return None;
    }
    Some(Diagnostic::note(message))
}

/// Parse a decimal number, clamping failures and overflow to 0 (unknown).
fn parse_u32(s: &str) -> u32 {
    s.parse::<u32>().unwrap_or(0)
}
