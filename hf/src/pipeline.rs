//! Render pipeline
//!
//! One render-and-emit cycle: resolve the active `.liquid` document, list the
//! assets directory, render the template, wrap it in the HTML shell, pretty-print
//! and overwrite `<workspace>/index.html`.
//!
//! Anticipated failures come back as [`RenderError`]; the caller turns them into
//! notifications. The only notification sent from here is the non-fatal
//! missing-assets warning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::assets::{list_assets, stylesheet_links};
use crate::config::Config;
use crate::engine::TemplateEngine;
use crate::error::RenderError;
use crate::host::{HostContext, has_extension};
use crate::notification::{Notification, Notifier};
use crate::pretty::prettify;
use crate::shell::{ShellContext, ShellLoader};

/// Warning shown when the workspace has no assets directory
pub const NO_ASSETS_WARNING: &str = "No assets folder detected";

/// What a successful render produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    /// Template that was rendered
    pub source: PathBuf,
    /// File that was written
    pub output: PathBuf,
    /// Asset entries linked as stylesheets
    pub stylesheets: Vec<String>,
    /// Size of the written document
    pub bytes: usize,
}

/// Renders templates into the workspace output file
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    globals: BTreeMap<String, serde_json::Value>,
}

impl Pipeline {
    /// Pipeline using the config's globals
    pub fn new(config: Config) -> Self {
        let globals = config.globals.clone();
        Self { config, globals }
    }

    /// Pipeline with `key=value` overrides on top of the config's globals
    pub fn with_vars(config: Config, vars: &[(String, String)]) -> Self {
        let globals = config.globals_with(vars);
        Self { config, globals }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extension that marks a file as a template source
    pub fn source_extension(&self) -> &str {
        &self.config.source_extension
    }

    /// Where the output lands for a given workspace root
    pub fn output_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.config.output_file)
    }

    /// Run one full cycle
    pub async fn run(&self, ctx: &HostContext, notifier: &dyn Notifier) -> Result<RenderReport, RenderError> {
        debug!(?ctx, "Pipeline::run: called");

        let document = ctx.active_document.as_deref().ok_or(RenderError::NoActiveDocument)?;
        let name = document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or(RenderError::NoActiveDocument)?;

        let root = ctx.workspace_root().ok_or(RenderError::NoWorkspace)?;

        let source = ctx.resolve(document);
        if !source.is_file() {
            debug!(?source, "Pipeline::run: source missing");
            return Err(RenderError::SourceNotFound { name, path: source });
        }
        if !has_extension(&source, &self.config.source_extension) {
            debug!(?source, "Pipeline::run: not a template source");
            return Err(RenderError::NotTemplate {
                name,
                extension: self.config.source_extension.clone(),
            });
        }

        let assets_dir = root.join(&self.config.assets_dir);
        let stylesheets = match list_assets(&assets_dir).await {
            Ok(names) => names,
            Err(e) => {
                warn!(?assets_dir, error = %e, "Assets directory not readable, continuing without stylesheets");
                notifier.notify(Notification::warning(NO_ASSETS_WARNING));
                Vec::new()
            }
        };

        let text = tokio::fs::read_to_string(&source)
            .await
            .map_err(|e| RenderError::ReadSource {
                path: source.clone(),
                source: e,
            })?;

        let engine = TemplateEngine::new(
            self.search_roots(root, &source),
            &self.config.source_extension,
            &self.globals,
        )?;
        let body = engine.render(&text)?;

        let html = self.assemble(root, body, &stylesheets)?;

        let output = self.output_path(root);
        tokio::fs::write(&output, &html)
            .await
            .map_err(|e| RenderError::WriteOutput {
                path: output.clone(),
                source: e,
            })?;

        info!(
            source = %source.display(),
            output = %output.display(),
            stylesheets = stylesheets.len(),
            bytes = html.len(),
            "Generated output"
        );

        Ok(RenderReport {
            source,
            output,
            stylesheets,
            bytes: html.len(),
        })
    }

    /// Wrap rendered content in the shell and pretty-print it
    pub fn assemble(&self, root: &Path, body: String, stylesheets: &[String]) -> Result<String, RenderError> {
        debug!(body_len = body.len(), stylesheets = stylesheets.len(), "Pipeline::assemble: called");
        let context = ShellContext {
            lang: self.config.lang.clone(),
            title: self.config.title.clone(),
            stylesheets: stylesheet_links(&self.config.assets_dir, stylesheets),
            body,
        };
        let html = ShellLoader::new(root).render(&context)?;
        Ok(prettify(&html))
    }

    /// Workspace root, the source's own directory, then the snippets directory
    fn search_roots(&self, root: &Path, source: &Path) -> Vec<PathBuf> {
        let mut roots = vec![root.to_path_buf()];
        if let Some(parent) = source.parent() {
            roots.push(parent.to_path_buf());
        }
        roots.push(root.join(&self.config.snippets_dir));
        roots.dedup();
        roots
    }
}
