//! # dx-build
//!
//! **Process supervision and diagnostics for build tooling.**
//!
//! Spawns compilers, build drivers, and search tools; streams their output
//! concurrently; turns recognizable lines into structured diagnostics; and
//! serializes whole build jobs through a FIFO queue. The crate is UI-free:
//! consumers attach through the [`OutputSink`] trait and exit callbacks.
//!
//! ## Pipeline
//!
//! ```text
//! BuildTasks ──► BuildSystem (detect) ──► ProcessRunner ──► lines
//!                                                             │
//!                       ProblemRouter ◄──────────────────────┘
//!                        │         │
//!                 ProblemList   OutputSink
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dx_build::{BuildTasks, BufferSink, OutputSink};
//!
//! let sink = Arc::new(BufferSink::new());
//! let mut tasks = BuildTasks::new("/path/to/project", Arc::clone(&sink) as Arc<dyn OutputSink>);
//! tasks.build(Some(Box::new(|code| println!("exited with {code}"))))?;
//! tasks.wait();
//! for line in sink.lines() {
//!     println!("{line}");
//! }
//! ```

pub mod detect;
pub mod diagnostic;
pub mod error;
pub mod parser;
pub mod problems;
pub mod queue;
pub mod ripgrep;
pub mod router;
pub mod run_config;
pub mod runner;
pub mod sink;
pub mod tasks;

// Re-exports
pub use detect::{BuildCommands, BuildSystem, BuildSystemKind, Platform, commands_for, split_command};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{BuildError, Result};
pub use parser::{DiagnosticParser, ParserKind};
pub use problems::{ActivateCallback, ProblemList};
pub use queue::BuildQueue;
pub use ripgrep::{RipgrepInfo, SearchOutput, discover, run_search, search_args};
pub use router::ProblemRouter;
pub use run_config::RunConfig;
pub use runner::{ExitCallback, ProcessRunner, RunnerState, SpawnSpec};
pub use sink::{BufferSink, ChannelSink, FnSink, NullSink, OutputSink, sink_from_line_fn};
pub use tasks::BuildTasks;
