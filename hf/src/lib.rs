//! htmlfy - Liquid to HTML on every save
//!
//! Watches a workspace for `.liquid` saves, renders the saved template with the
//! Liquid engine, wraps the result in an HTML5 shell with a stylesheet link for
//! every file under `assets/`, pretty-prints it and overwrites `index.html` in
//! the workspace root.
//!
//! # Flow
//!
//! ```text
//! save event ─▶ Session::on_save ─▶ Pipeline::run
//!                                     ├─ assets::list_assets
//!                                     ├─ engine::TemplateEngine::render
//!                                     ├─ shell::ShellLoader::render
//!                                     ├─ pretty::prettify
//!                                     └─ write <workspace>/index.html
//! ```
//!
//! # Modules
//!
//! - [`session`] - armed/idle lifecycle and the command/save triggers
//! - [`pipeline`] - the render-and-emit cycle
//! - [`engine`] - Liquid parser with search-root partials
//! - [`shell`] - the HTML document skeleton (Handlebars)
//! - [`pretty`] - HTML pretty-printer
//! - [`watcher`] - filesystem save events
//! - [`notification`] - user-visible messages
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod assets;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod notification;
pub mod pipeline;
pub mod pretty;
pub mod session;
pub mod shell;
pub mod watcher;

pub use config::Config;
pub use engine::TemplateEngine;
pub use error::RenderError;
pub use host::HostContext;
pub use notification::{ConsoleNotifier, Level, Notification, Notifier, RecordingNotifier};
pub use pipeline::{Pipeline, RenderReport};
pub use session::{Session, SessionState};
pub use watcher::{SaveWatcher, WatcherConfig};

/// Extension of template sources, without the dot
pub const SOURCE_EXTENSION: &str = "liquid";

/// Name of the generated file in the workspace root
pub const OUTPUT_FILE: &str = "index.html";
