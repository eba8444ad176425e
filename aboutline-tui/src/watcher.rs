//! File watching for external changes to open documents

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::event::DocId;

/// Watches every open document and reports debounced changes per document
pub struct WorkspaceWatcher {
    watcher: RecommendedWatcher,
    receiver: Receiver<PathBuf>,
    // The same file may be open as several documents
    docs: HashMap<PathBuf, Vec<DocId>>,
    // Parent directories are shared between documents, so count their users
    dirs: HashMap<PathBuf, usize>,
    pending: HashMap<DocId, Instant>,
}

impl WorkspaceWatcher {
    pub fn new() -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            }
        })
        .context("Failed to create file watcher")?;

        Ok(Self {
            watcher,
            receiver: rx,
            docs: HashMap::new(),
            dirs: HashMap::new(),
            pending: HashMap::new(),
        })
    }

    /// Start watching `path` on behalf of document `id`
    pub fn watch(&mut self, id: DocId, path: &Path) -> Result<()> {
        // Watch the parent directory, editors often save by atomic rename
        let dir = path
            .parent()
            .with_context(|| format!("No parent directory for {}", path.display()))?
            .to_path_buf();

        if !self.dirs.contains_key(&dir) {
            self.watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch directory: {}", dir.display()))?;
        }
        *self.dirs.entry(dir).or_insert(0) += 1;
        self.docs.entry(path.to_path_buf()).or_default().push(id);

        log::debug!("Watching {} for document {}", path.display(), id);
        Ok(())
    }

    /// Stop watching the document `id`
    pub fn unwatch(&mut self, id: DocId) {
        let Some(path) = self
            .docs
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(path, _)| path.clone())
        else {
            return;
        };
        if let Some(ids) = self.docs.get_mut(&path) {
            ids.retain(|doc| *doc != id);
            if ids.is_empty() {
                self.docs.remove(&path);
            }
        }
        self.pending.remove(&id);

        if let Some(dir) = path.parent() {
            if let Some(count) = self.dirs.get_mut(dir) {
                *count -= 1;
                if *count == 0 {
                    self.dirs.remove(dir);
                    if let Err(e) = self.watcher.unwatch(dir) {
                        log::warn!("Failed to unwatch {}: {}", dir.display(), e);
                    }
                }
            }
        }
    }

    /// Documents whose last change is older than the debounce period
    pub fn poll_changed(&mut self, debounce_ms: u64) -> Vec<DocId> {
        let now = Instant::now();
        while let Ok(path) = self.receiver.try_recv() {
            self.record_change(&path, now);
        }

        let debounce = Duration::from_millis(debounce_ms);
        let mut ready: Vec<DocId> = self
            .pending
            .iter()
            .filter(|(_, last)| last.elapsed() >= debounce)
            .map(|(id, _)| *id)
            .collect();
        ready.sort();

        for id in &ready {
            self.pending.remove(id);
        }
        ready
    }

    /// Whether any change is waiting out its debounce period
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn record_change(&mut self, path: &Path, at: Instant) {
        if let Some(ids) = self.docs.get(path) {
            for id in ids {
                self.pending.insert(*id, at);
            }
        }
    }

    #[cfg(test)]
    fn is_watching(&self, id: DocId) -> bool {
        self.docs.values().any(|ids| ids.contains(&id))
    }
}
