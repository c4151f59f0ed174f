//! Save detection through filesystem events.
//!
//! Editors often write a file several times per save (truncate, write,
//! rename over the original). Events are batched for a short quiet period
//! and deduplicated before they reach the save handler.

use notify::event::{CreateKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Directory names whose contents never count as saves
const IGNORED_DIRS: &[&str] = &["node_modules", ".git"];

/// Watches a project recursively and yields batches of saved files
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    batcher: SaveBatcher,
}

impl DocumentWatcher {
    /// Start watching `root`
    pub fn new(root: &Path, debounce: Duration) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_save(&event.kind) => {
                for path in event.paths {
                    if !is_ignored(&path) {
                        let _ = tx.send(path);
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "File watcher error"),
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::debug!(root = %root.display(), "Watching project");

        Ok(Self {
            _watcher: watcher,
            batcher: SaveBatcher::new(rx, debounce),
        })
    }

    /// Wait for the next batch of saved files
    ///
    /// Returns `None` once the watcher stopped.
    pub async fn next_batch(&mut self) -> Option<Vec<PathBuf>> {
        self.batcher.next_batch().await
    }
}

/// Groups paths arriving close together and drops duplicates
pub struct SaveBatcher {
    rx: mpsc::UnboundedReceiver<PathBuf>,
    debounce: Duration,
}

impl SaveBatcher {
    pub const fn new(rx: mpsc::UnboundedReceiver<PathBuf>, debounce: Duration) -> Self {
        Self { rx, debounce }
    }

    /// Wait for a path, then collect until the channel is quiet for the
    /// debounce period. Paths that no longer name a file are dropped.
    pub async fn next_batch(&mut self) -> Option<Vec<PathBuf>> {
        loop {
            let first = self.rx.recv().await?;
            let mut batch = vec![first];
            while let Ok(Some(path)) = tokio::time::timeout(self.debounce, self.rx.recv()).await {
                if !batch.contains(&path) {
                    batch.push(path);
                }
            }

            batch.retain(|path| path.is_file());
            if !batch.is_empty() {
                return Some(batch);
            }
        }
    }
}

fn is_save(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(CreateKind::File | CreateKind::Any) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

fn is_ignored(path: &Path) -> bool {
    path.components()
        .any(|c| IGNORED_DIRS.iter().any(|ignored| c.as_os_str() == OsStr::new(ignored)))
}
