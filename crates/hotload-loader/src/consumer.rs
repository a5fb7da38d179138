//! Ingestion consumer. Drains the queue one path per host tick.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::bridge::ExecutorHandle;
use crate::error::IngestErrorKind;
use crate::pipeline::IngestionPipeline;
use crate::queue::IngestionQueue;

/// Result of one consumer tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was queued.
    Idle,
    /// A module was ingested and handed to the host.
    Loaded(ExecutorHandle),
    /// Ingestion of a module failed; the error was logged.
    Failed {
        path: PathBuf,
        kind: IngestErrorKind,
    },
}

/// Single consumer of an [`IngestionQueue`].
#[derive(Debug)]
pub struct IngestionConsumer {
    queue: IngestionQueue,
    pipeline: IngestionPipeline,
}

impl IngestionConsumer {
    pub fn new(queue: IngestionQueue, pipeline: IngestionPipeline) -> Self {
        Self { queue, pipeline }
    }

    pub fn queue(&self) -> &IngestionQueue {
        &self.queue
    }

    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.pipeline
    }

    /// Ingests at most one queued path, blocking until it is done.
    ///
    /// Failures are logged here and never escape.
    pub fn tick(&self) -> TickOutcome {
        let Some(path) = self.queue.dequeue() else {
            return TickOutcome::Idle;
        };

        tracing::info!(path = %path.display(), "Ingesting plugin module");

        match self.pipeline.load_from_file(&path) {
            Ok(handle) => TickOutcome::Loaded(handle),
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    kind = %e.kind(),
                    error = %e,
                    "Failed to ingest plugin module"
                );
                TickOutcome::Failed {
                    path,
                    kind: e.kind(),
                }
            }
        }
    }

    /// Ticks on a fixed cadence until `shutdown` turns `true`.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_ms = interval.as_millis() as u64, "Ingestion consumer started");

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Ingestion consumer received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }

        tracing::info!(pending = self.queue.len(), "Ingestion consumer stopped");
    }
}
