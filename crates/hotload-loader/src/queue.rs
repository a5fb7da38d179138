//! Ingestion queue.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

/// FIFO of module paths waiting to be ingested.
///
/// Clones share the same queue, so any number of producers can hold one.
/// Only the consumer dequeues.
#[derive(Debug, Clone, Default)]
pub struct IngestionQueue {
    inner: Arc<Mutex<VecDeque<PathBuf>>>,
}

impl IngestionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path. The same path may be queued any number of times.
    pub fn enqueue(&self, path: impl Into<PathBuf>) {
        self.inner.lock().push_back(path.into());
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub(crate) fn dequeue(&self) -> Option<PathBuf> {
        self.inner.lock().pop_front()
    }
}
