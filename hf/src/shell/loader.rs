//! Shell Loader
//!
//! Loads the shell template from the workspace or falls back to the embedded default.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::error::RenderError;

/// Values the shell template sees
#[derive(Debug, Clone, Serialize)]
pub struct ShellContext {
    /// `lang` attribute of `<html>`
    pub lang: String,
    /// Document title
    pub title: String,
    /// Pre-built `<link>` fragment, may be empty
    pub stylesheets: String,
    /// Rendered template output
    pub body: String,
}

/// Loads and renders the document shell
pub struct ShellLoader {
    hbs: Handlebars<'static>,
    /// Workspace override (`.htmlfy/shell.hbs`), when present
    override_path: Option<PathBuf>,
}

impl ShellLoader {
    /// Create a loader for the given workspace root
    pub fn new(workspace: impl AsRef<Path>) -> Self {
        let workspace = workspace.as_ref();
        debug!(?workspace, "ShellLoader::new: called");
        let path = workspace.join(".htmlfy").join("shell.hbs");
        let override_path = if path.is_file() {
            debug!(?path, "ShellLoader::new: workspace override found");
            Some(path)
        } else {
            debug!("ShellLoader::new: no workspace override");
            None
        };

        Self {
            hbs: Handlebars::new(),
            override_path,
        }
    }

    /// Create a loader that only uses the embedded shell
    pub fn embedded_only() -> Self {
        debug!("ShellLoader::embedded_only: called");
        Self {
            hbs: Handlebars::new(),
            override_path: None,
        }
    }

    fn load_template(&self) -> Result<String, RenderError> {
        if let Some(ref path) = self.override_path {
            debug!(?path, "ShellLoader::load_template: reading workspace override");
            return std::fs::read_to_string(path)
                .map_err(|e| RenderError::Shell(format!("Failed to read {}: {}", path.display(), e)));
        }
        debug!("ShellLoader::load_template: using embedded shell");
        Ok(embedded::SHELL.to_string())
    }

    /// Wrap rendered content in the shell
    pub fn render(&self, context: &ShellContext) -> Result<String, RenderError> {
        debug!(
            body_len = context.body.len(),
            stylesheets_len = context.stylesheets.len(),
            "ShellLoader::render: called"
        );
        let template = self.load_template()?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| RenderError::Shell(e.to_string()))
    }
}
