//! Partial lookup over the search roots

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use liquid::partials::PartialSource;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::host::has_extension;

/// Directories never scanned for partial names
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "vendor"];

/// Partial source backed by the filesystem search roots
///
/// Lookups read the file fresh each time; nothing is cached across renders.
/// Names are confined to the roots: absolute names and `..` never resolve.
#[derive(Debug, Clone)]
pub struct SearchRootSource {
    roots: Vec<PathBuf>,
    extension: String,
    names: OnceLock<Vec<String>>,
}

impl SearchRootSource {
    pub fn new(roots: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        debug!(?roots, %extension, "SearchRootSource::new: called");
        Self {
            roots,
            extension,
            names: OnceLock::new(),
        }
    }

    /// Find the file a partial name refers to, first root wins
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let requested = Path::new(name);
        if !is_confined(requested) {
            debug!(%name, "SearchRootSource::locate: name escapes the search roots");
            return None;
        }

        let candidates: Vec<PathBuf> = if has_extension(requested, &self.extension) {
            vec![requested.to_path_buf()]
        } else {
            vec![
                PathBuf::from(format!("{}.{}", name, self.extension)),
                requested.to_path_buf(),
            ]
        };

        for root in &self.roots {
            for candidate in &candidates {
                let path = root.join(candidate);
                if path.is_file() && stays_under(root, &path) {
                    debug!(%name, ?path, "SearchRootSource::locate: found");
                    return Some(path);
                }
            }
        }
        debug!(%name, "SearchRootSource::locate: not found");
        None
    }
}

impl PartialSource for SearchRootSource {
    fn contains(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    fn names(&self) -> Vec<&str> {
        self.names
            .get_or_init(|| discover_names(&self.roots, &self.extension))
            .iter()
            .map(String::as_str)
            .collect()
    }

    fn try_get<'a>(&'a self, name: &str) -> Option<Cow<'a, str>> {
        let path = self.locate(name)?;
        std::fs::read_to_string(path).ok().map(Cow::Owned)
    }
}

/// Only plain relative segments; no root, prefix or `..`
fn is_confined(name: &Path) -> bool {
    !name.as_os_str().is_empty()
        && name
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Guards against symlinks pointing out of the root
fn stays_under(root: &Path, path: &Path) -> bool {
    match (root.canonicalize(), path.canonicalize()) {
        (Ok(root), Ok(path)) => path.starts_with(root),
        _ => false,
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&&*name)
}

/// Partial names as they would be written in an include, relative to a root
fn discover_names(roots: &[PathBuf], extension: &str) -> Vec<String> {
    debug!(?roots, "discover_names: called");
    let mut names = Vec::new();
    for root in roots {
        let entries = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_skipped(e))
            .filter_map(|e| e.ok());
        for entry in entries {
            let path = entry.path();
            if !entry.file_type().is_file() || !has_extension(path, extension) {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(root) {
                let name = relative.with_extension("").to_string_lossy().replace('\\', "/");
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }
    names.sort();
    debug!(count = names.len(), "discover_names: done");
    names
}
