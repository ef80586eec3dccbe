//! # dx-workspace
//!
//! **Workspace state for build tooling: what's on disk, what changed, and
//! where the user left off.**
//!
//! Pairs a sorted file index with a hand-assembled recursive directory
//! watcher, and persists the small pieces of session state (current root,
//! last file, recent files, run configuration location) as pretty JSON
//! under one config directory.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dx_workspace::{ConfigDir, FileIndex, RecursiveWatcher, Workspace};
//!
//! let config = ConfigDir::new("/home/me/.local/share/dx");
//! config.ensure()?;
//!
//! let mut workspace = Workspace::new(config.workspace_file(), "/home/me/project");
//! workspace.restore();
//!
//! let index = FileIndex::build(workspace.root())?;
//! let watcher = RecursiveWatcher::new(workspace.root(), |event| {
//!     println!("{:?} {}", event.kind, event.path.display());
//! })?;
//! ```

pub mod error;
pub mod index;
pub mod paths;
pub mod recent;
pub mod session;
pub mod watcher;
pub mod workspace;

// Re-exports
pub use error::{Result, WorkspaceError};
pub use index::FileIndex;
pub use paths::ConfigDir;
pub use recent::RecentFiles;
pub use session::Session;
pub use watcher::{PathEvent, PathEventKind, RecursiveWatcher};
pub use workspace::{Workspace, WorkspaceObserver};
