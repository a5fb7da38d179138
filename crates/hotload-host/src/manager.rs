//! Plugin manager: owns the executor list and the scene lifecycle.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use hotload_core::config::HostConfig;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{info, warn};
use wasmtime::{Config, Engine};

use crate::error::HostError;
use crate::events::HostEvent;
use crate::executor::{ExecutorState, PluginExecutor};

/// Owns every plugin executor the host runs.
///
/// Executors are only ever added by the host's own startup path; there is
/// no public registration method. The list comes into existence in
/// [`PluginManager::start`].
pub struct PluginManager {
    /// Shared compilation engine; modules must be compiled with it.
    engine: Engine,
    /// Host settings.
    config: HostConfig,
    /// Internal executor list; `None` until startup completes.
    pub(crate) plugins: OnceLock<Mutex<Vec<PluginExecutor>>>,
    /// Soft restart counter.
    generation: AtomicU64,
    /// Host event broadcaster.
    events: broadcast::Sender<HostEvent>,
}

impl PluginManager {
    /// Creates a host with a fuel-metered engine.
    pub fn new(config: HostConfig) -> Result<Self, HostError> {
        let mut engine_config = Config::new();
        engine_config.consume_fuel(true);
        let engine = Engine::new(&engine_config).map_err(HostError::Engine)?;

        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Ok(Self {
            engine,
            config,
            plugins: OnceLock::new(),
            generation: AtomicU64::new(0),
            events,
        })
    }

    /// Engine every plugin module must be compiled with.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Fuel granted to each lifecycle hook call.
    pub fn fuel_per_hook(&self) -> u64 {
        self.config.fuel_per_hook
    }

    /// Completes host startup and brings the plugin list into existence.
    ///
    /// Calling this more than once has no further effect.
    pub fn start(&self) {
        if self.plugins.set(Mutex::new(Vec::new())).is_ok() {
            info!("Plugin host started");
            let _ = self.events.send(HostEvent::Started);
        }
    }

    /// Whether [`start`](Self::start) has run.
    pub fn is_started(&self) -> bool {
        self.plugins.get().is_some()
    }

    /// Ids of all executors, in list order.
    pub fn plugin_ids(&self) -> Vec<String> {
        self.plugins
            .get()
            .map(|list| {
                list.lock()
                    .iter()
                    .map(|executor| executor.metadata().id().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of executors in the list.
    pub fn plugin_count(&self) -> usize {
        self.plugins.get().map(|list| list.lock().len()).unwrap_or(0)
    }

    /// State of the executor at `slot`, if any.
    pub fn executor_state(&self, slot: usize) -> Option<ExecutorState> {
        self.plugins
            .get()
            .and_then(|list| list.lock().get(slot).map(PluginExecutor::state))
    }

    /// Whether any executor with this id is currently enabled.
    pub fn is_enabled(&self, plugin_id: &str) -> bool {
        self.plugins
            .get()
            .map(|list| {
                list.lock().iter().any(|executor| {
                    executor.metadata().id() == plugin_id
                        && executor.state() == ExecutorState::Enabled
                })
            })
            .unwrap_or(false)
    }

    /// Number of soft restarts performed so far.
    pub fn restart_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Subscribes to host events.
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.events.subscribe()
    }

    /// Re-enters the scene lifecycle without ending the process.
    ///
    /// Every enabled plugin observes `on_scene_start` again. Hook failures
    /// are logged and do not stop the restart.
    pub fn soft_restart(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "Soft restart requested");

        if let Some(list) = self.plugins.get() {
            for executor in list.lock().iter_mut() {
                if let Err(e) = executor.scene_start() {
                    warn!(
                        plugin_id = %executor.metadata().id(),
                        error = %e,
                        "Scene start hook failed during soft restart"
                    );
                }
            }
        }

        let _ = self.events.send(HostEvent::SoftRestart { generation });
        generation
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("started", &self.is_started())
            .field("plugin_count", &self.plugin_count())
            .field("generation", &self.restart_generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_absent_until_started() {
        let manager = PluginManager::new(HostConfig::default()).unwrap();
        assert!(!manager.is_started());
        assert_eq!(manager.plugin_count(), 0);

        manager.start();
        manager.start();
        assert!(manager.is_started());
        assert!(manager.plugin_ids().is_empty());
    }

    #[tokio::test]
    async fn test_soft_restart_broadcasts_generation() {
        let manager = PluginManager::new(HostConfig::default()).unwrap();
        let mut events = manager.subscribe();
        manager.start();

        assert_eq!(manager.soft_restart(), 1);
        assert_eq!(manager.soft_restart(), 2);

        assert_eq!(events.recv().await.unwrap(), HostEvent::Started);
        assert_eq!(
            events.recv().await.unwrap(),
            HostEvent::SoftRestart { generation: 1 }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            HostEvent::SoftRestart { generation: 2 }
        );
    }
}
