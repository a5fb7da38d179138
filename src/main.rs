//! Hotload host: a plugin host that picks up new plugin modules at runtime.
//!
//! Main entry point that wires the reference host and the ingestion
//! pipeline together and runs the host tick until shutdown.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing_subscriber::{EnvFilter, fmt};

use hotload_core::config::AppConfig;
use hotload_core::error::{AppError, ErrorKind};
use hotload_core::result::AppResult;
use hotload_host::{HostEvent, PluginManager};
use hotload_loader::{
    FolderWatcher, HostBridge, HostRegistrar, IngestionConsumer, IngestionPipeline,
    IngestionQueue, LoadTracker, MetadataReader, TrackerDirectory,
};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let initial: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    if let Err(e) = run(config, initial).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> AppResult<AppConfig> {
    let config_path =
        std::env::var("HOTLOAD_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    let config = AppConfig::load(&config_path)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main host run function
async fn run(config: AppConfig, initial: Vec<PathBuf>) -> AppResult<()> {
    tracing::info!("Starting Hotload host v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Start the plugin host ───────────────────────────
    let manager = Arc::new(PluginManager::new(config.host.clone())?);
    let events = manager.subscribe();
    manager.start();
    let event_log = tokio::spawn(log_host_events(events));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal = async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    };

    if !config.loader.enabled {
        tracing::info!("Dynamic plugin loading disabled");
        signal.await;
        event_log.abort();
        return Ok(());
    }

    // ── Step 2: Bind the loader to the host ─────────────────────
    let registrar = HostRegistrar::bind(Arc::clone(&manager))?;
    let tracker = Arc::new(LoadTracker::new());
    let directory = TrackerDirectory::new();
    directory.publish(config.loader.instance_name.clone(), Arc::clone(&tracker));

    let bridge = HostBridge::new(Arc::new(registrar), Arc::clone(&tracker));
    let reader = MetadataReader::with_search_dirs(config.loader.search_dirs());
    let pipeline = IngestionPipeline::new(reader, manager.engine().clone(), bridge);

    // ── Step 3: Producers ───────────────────────────────────────
    let queue = IngestionQueue::new();
    for path in initial {
        queue.enqueue(path);
    }

    let _watcher = if config.loader.watch_folder {
        let watcher =
            FolderWatcher::start(&config.loader.plugins_dir, &config.loader.extension, queue.clone())
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Io,
                        format!("Failed to watch '{}'", config.loader.plugins_dir),
                        e,
                    )
                })?;
        Some(watcher)
    } else {
        tracing::info!("Plugins folder watch disabled");
        None
    };

    // ── Step 4: Host tick drives the consumer ───────────────────
    let consumer = IngestionConsumer::new(queue, pipeline);
    let interval = Duration::from_millis(config.loader.tick_interval_ms);

    tokio::join!(consumer.run(interval, shutdown_rx), signal);

    event_log.abort();
    for instance in directory.instance_names() {
        tracing::info!(
            instance = %instance,
            loaded = ?directory.get(&instance).map(|t| t.snapshot()),
            "Loader instance summary"
        );
    }
    tracing::info!("Hotload host shut down");
    Ok(())
}

/// Log host lifecycle events until the channel closes
async fn log_host_events(mut events: broadcast::Receiver<HostEvent>) {
    loop {
        match events.recv().await {
            Ok(HostEvent::Started) => tracing::info!("Host started"),
            Ok(HostEvent::SoftRestart { generation }) => {
                tracing::info!(generation, "Scene lifecycle restarted");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Host event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
