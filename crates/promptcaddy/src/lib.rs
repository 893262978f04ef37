//! PromptCaddy core: Markdown prompt loading, hot reload, and interpolation.

pub mod frontmatter;
pub mod interpolate;
pub mod store;
pub mod types;
pub mod watcher;

pub use interpolate::{placeholder, render, Bindings, SELECTION};
pub use store::{PromptStore, ReloadReport, SkippedFile};
pub use types::*;
pub use watcher::{DirectoryWatcher, WatchOp};
