//! Test-loading modules into a throwaway in-process host.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::output::{self, OutputFormat};
use hotload_core::error::AppError;
use hotload_core::result::AppResult;
use hotload_host::PluginManager;
use hotload_loader::{
    HostBridge, HostRegistrar, IngestionConsumer, IngestionPipeline, IngestionQueue, LoadTracker,
    MetadataReader, TickOutcome,
};

/// Arguments for the load command
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Module files, ingested in the given order
    #[arg(required = true)]
    pub modules: Vec<PathBuf>,
}

/// Outcome of ingesting one module
#[derive(Debug, Serialize, Tabled)]
struct LoadRow {
    #[tabled(rename = "Module")]
    path: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Plugin id")]
    plugin_id: String,
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Enabled")]
    enabled: bool,
    #[tabled(rename = "At")]
    at: String,
}

/// Execute the load command
pub async fn execute(
    args: &LoadArgs,
    config_path: &str,
    format: OutputFormat,
) -> AppResult<()> {
    let config = super::load_config(config_path)?;

    let manager = Arc::new(PluginManager::new(config.host.clone())?);
    manager.start();

    let registrar = HostRegistrar::bind(Arc::clone(&manager))?;
    let tracker = Arc::new(LoadTracker::new());
    let bridge = HostBridge::new(Arc::new(registrar), Arc::clone(&tracker));
    let reader = MetadataReader::with_search_dirs(config.loader.search_dirs());
    let pipeline = IngestionPipeline::new(reader, manager.engine().clone(), bridge);

    let queue = IngestionQueue::new();
    for path in &args.modules {
        queue.enqueue(path.clone());
    }
    let consumer = IngestionConsumer::new(queue, pipeline);

    let mut rows = Vec::with_capacity(args.modules.len());
    for path in &args.modules {
        let at = Utc::now().format("%H:%M:%S%.3f").to_string();
        let row = match consumer.tick() {
            TickOutcome::Loaded(handle) => {
                debug!(
                    path = %path.display(),
                    plugin_id = %handle.plugin_id,
                    slot = handle.slot,
                    "Module loaded"
                );
                LoadRow {
                    path: path.display().to_string(),
                    status: "loaded".to_string(),
                    enabled: manager.is_enabled(&handle.plugin_id),
                    plugin_id: handle.plugin_id,
                    slot: handle.slot.to_string(),
                    at,
                }
            }
            TickOutcome::Failed { path, kind } => {
                debug!(path = %path.display(), %kind, "Module failed to load");
                LoadRow {
                    path: path.display().to_string(),
                    status: kind.to_string(),
                    plugin_id: "-".to_string(),
                    slot: "-".to_string(),
                    enabled: false,
                    at,
                }
            }
            TickOutcome::Idle => break,
        };
        rows.push(row);
    }

    output::print_list(&rows, format);

    let failed = rows.iter().filter(|row| row.status != "loaded").count();
    if format == OutputFormat::Table {
        println!();
        output::print_kv("Loaded", &tracker.len().to_string());
        output::print_kv("Host plugins", &manager.plugin_count().to_string());
        output::print_kv("Soft restarts", &manager.restart_generation().to_string());
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(AppError::plugin(format!(
            "{failed} of {} modules failed to load",
            rows.len()
        )))
    }
}
