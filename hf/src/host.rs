//! What the host knows at trigger time: workspace folders and the active document

use std::path::{Path, PathBuf};

use tracing::debug;

/// Snapshot of the host environment handed to a render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    /// Configured project roots; the first one is the workspace root
    pub workspace_folders: Vec<PathBuf>,
    /// Document the user is editing, if any
    pub active_document: Option<PathBuf>,
}

impl HostContext {
    pub fn new(workspace_folders: Vec<PathBuf>, active_document: Option<PathBuf>) -> Self {
        Self {
            workspace_folders,
            active_document,
        }
    }

    /// The first configured workspace folder
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_folders.first().map(PathBuf::as_path)
    }

    /// Same folders, different active document
    pub fn with_active_document(&self, document: impl Into<PathBuf>) -> Self {
        let document = document.into();
        debug!(?document, "HostContext::with_active_document: called");
        Self {
            workspace_folders: self.workspace_folders.clone(),
            active_document: Some(document),
        }
    }

    /// Resolve a document path against the workspace root
    ///
    /// Relative paths are taken relative to the workspace root when one exists,
    /// so `index.liquid` and `/proj/index.liquid` name the same file.
    pub fn resolve(&self, document: &Path) -> PathBuf {
        if document.is_absolute() {
            return document.to_path_buf();
        }
        match self.workspace_root() {
            Some(root) => root.join(document),
            None => document.to_path_buf(),
        }
    }
}

/// True when `path` carries the template extension (`liquid`, no dot)
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == extension)
}
