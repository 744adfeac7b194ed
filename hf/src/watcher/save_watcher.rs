//! Save watcher implementation

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::WatcherConfig;
use crate::host::has_extension;

/// Template paths a filesystem event counts as saving
pub fn saved_templates(event: &Event, extension: &str) -> Vec<PathBuf> {
    let is_write = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };
    if !is_write {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter(|p| has_extension(p, extension))
        .cloned()
        .collect()
}

/// Drop repeated paths, keeping first-arrival order
pub fn collapse(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::with_capacity(paths.len());
    for path in paths {
        if !out.contains(&path) {
            out.push(path);
        }
    }
    out
}

/// Watches a workspace root for template saves
pub struct SaveWatcher {
    config: WatcherConfig,
    root: PathBuf,
    extension: String,
}

impl SaveWatcher {
    /// Create a new SaveWatcher
    pub fn new(config: WatcherConfig, root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            config,
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Subscribe to filesystem events under the root
    ///
    /// Watching stops when the returned `SaveEvents` is dropped.
    pub fn start(&self) -> Result<SaveEvents> {
        debug!(root = ?self.root, extension = %self.extension, "SaveWatcher::start: called");
        let (tx, rx) = mpsc::unbounded_channel();
        let extension = self.extension.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for path in saved_templates(&event, &extension) {
                    // Receiver gone means the watch loop has ended
                    let _ = tx.send(path);
                }
            }
            Err(e) => warn!(error = %e, "Filesystem watch error"),
        })
        .context("Failed to create filesystem watcher")?;

        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .context(format!("Failed to watch {}", self.root.display()))?;

        info!(root = %self.root.display(), "Watching for template saves");
        Ok(SaveEvents {
            _watcher: watcher,
            rx,
            config: self.config.clone(),
            pending: Vec::new(),
        })
    }
}

/// Stream of collapsed save batches
pub struct SaveEvents {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<PathBuf>,
    config: WatcherConfig,
    /// Paths received for the batch in progress
    pending: Vec<PathBuf>,
}

impl SaveEvents {
    /// Wait for the next save, then gather everything that settles with it
    ///
    /// Returns `None` once the watcher has shut down. Cancel safe: paths
    /// received before the future is dropped stay queued for the next call.
    pub async fn next(&mut self) -> Option<Vec<PathBuf>> {
        if self.pending.is_empty() {
            let first = self.rx.recv().await?;
            self.pending.push(first);
        }
        let settle = self.config.settle();
        while let Ok(Some(path)) = tokio::time::timeout(settle, self.rx.recv()).await {
            self.pending.push(path);
        }
        let batch = collapse(std::mem::take(&mut self.pending));
        debug!(?batch, "SaveEvents::next: batch settled");
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, p| event.add_path(PathBuf::from(p)))
    }

    #[test]
    fn test_modify_of_template_is_save() {
        let e = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/proj/index.liquid", "/proj/index.html"],
        );
        assert_eq!(saved_templates(&e, "liquid"), vec![PathBuf::from("/proj/index.liquid")]);
    }

    #[test]
    fn test_create_is_save() {
        let e = event(EventKind::Create(CreateKind::File), &["/proj/new.liquid"]);
        assert_eq!(saved_templates(&e, "liquid").len(), 1);
    }

    #[test]
    fn test_output_write_is_not_save() {
        let e = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/proj/index.html"],
        );
        assert!(saved_templates(&e, "liquid").is_empty());
    }

    #[test]
    fn test_non_write_kinds_ignored() {
        for kind in [
            EventKind::Remove(RemoveKind::File),
            EventKind::Access(AccessKind::Any),
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)),
        ] {
            let e = event(kind, &["/proj/index.liquid"]);
            assert!(saved_templates(&e, "liquid").is_empty(), "{:?}", e.kind);
        }
    }

    #[test]
    fn test_collapse_keeps_first_order() {
        let paths = vec![
            PathBuf::from("/b.liquid"),
            PathBuf::from("/a.liquid"),
            PathBuf::from("/b.liquid"),
        ];
        assert_eq!(collapse(paths), vec![PathBuf::from("/b.liquid"), PathBuf::from("/a.liquid")]);
    }

    #[tokio::test]
    async fn test_watch_reports_template_write() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let watcher = SaveWatcher::new(WatcherConfig::default(), &root, "liquid");
        let mut events = watcher.start().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        std::fs::write(root.join("index.liquid"), "hi").unwrap();

        let batch = tokio::time::timeout(std::time::Duration::from_secs(5), events.next())
            .await
            .expect("no save event within 5s")
            .unwrap();
        assert!(batch.iter().any(|p| p.ends_with("index.liquid")), "{:?}", batch);
    }
}
