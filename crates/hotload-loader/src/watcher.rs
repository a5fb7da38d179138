//! Plugins folder watcher feeding newly created module files into the queue.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::queue::IngestionQueue;

/// Watches one directory and feeds created module files into a queue.
///
/// A path is queued as soon as it appears and is never retried, so a file
/// copied or written in place may be read while still partial. Writers should
/// finish the file elsewhere on the same filesystem and move it into the
/// folder; the move is picked up as an arrival.
///
/// Watching stops when this is dropped.
pub struct FolderWatcher {
    _watcher: RecommendedWatcher,
    dir: PathBuf,
}

impl FolderWatcher {
    /// Starts watching `dir` (created if missing, not recursive).
    pub fn start(
        dir: impl AsRef<Path>,
        extension: &str,
        queue: IngestionQueue,
    ) -> notify::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(notify::Error::io)?;

        let extension = extension.trim_start_matches('.').to_string();
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<Event>| match result {
                Ok(event) => {
                    for path in paths_to_enqueue(&event, &extension) {
                        tracing::debug!(path = %path.display(), "New plugin file detected");
                        queue.enqueue(path);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Plugin folder watch error");
                }
            })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(dir = %dir.display(), "Watching plugins folder");
        Ok(Self {
            _watcher: watcher,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl std::fmt::Debug for FolderWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderWatcher").field("dir", &self.dir).finish()
    }
}

/// Paths from `event` that should be ingested.
///
/// Only file creations and files moved into the folder count; the extension
/// check ignores ASCII case.
pub fn paths_to_enqueue(event: &Event, extension: &str) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => return Vec::new(),
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {}
        _ => return Vec::new(),
    }

    event
        .paths
        .iter()
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .cloned()
        .collect()
}
