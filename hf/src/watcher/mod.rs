//! Watcher module for template saves
//!
//! The SaveWatcher subscribes to filesystem events under the workspace root and
//! turns writes to `.liquid` files into save events for the session. Bursts of
//! events for one save are collapsed within a short settle window.

mod config;
mod save_watcher;

pub use config::WatcherConfig;
pub use save_watcher::{SaveEvents, SaveWatcher, collapse, saved_templates};
