//! HTML Shell
//!
//! The document skeleton the rendered template is wrapped in: doctype, head
//! with charset/viewport meta tags, title and stylesheet links, and a body
//! holding the rendered content.
//!
//! Template loading chain:
//! 1. `<workspace>/.htmlfy/shell.hbs` (workspace override)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax; `stylesheets` and `body` are inserted
//! unescaped with `{{{ }}}`.

pub mod embedded;
mod loader;

pub use loader::{ShellContext, ShellLoader};
