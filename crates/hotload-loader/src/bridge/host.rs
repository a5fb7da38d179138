//! Registrar backed by the reference plugin host.
//!
//! The host has no public way to add executors after startup. This adapter
//! appends to the list exposed by `hotload_host::internals` and so depends
//! on it staying a homogeneous, appendable `Vec<PluginExecutor>` that only
//! exists once the host has started.

use std::sync::Arc;

use hotload_host::internals;
use hotload_host::{PluginExecutor, PluginManager, PluginManifest, PluginMetadata, Special};
use tracing::debug;
use wasmtime::Engine;

use super::{ExecutorHandle, PluginRegistrar};
use crate::error::IngestError;
use crate::record::PluginRecord;

/// [`PluginRegistrar`] over a running [`PluginManager`].
#[derive(Debug, Clone)]
pub struct HostRegistrar {
    manager: Arc<PluginManager>,
}

impl HostRegistrar {
    /// Binds to `manager`, checking that its internal list is reachable.
    pub fn bind(manager: Arc<PluginManager>) -> Result<Self, IngestError> {
        if internals::plugin_list(&manager).is_none() {
            return Err(IngestError::HostRegistration(
                "host plugin list is unavailable; has the host started?".to_string(),
            ));
        }
        Ok(Self { manager })
    }

    pub fn manager(&self) -> &Arc<PluginManager> {
        &self.manager
    }
}

impl PluginRegistrar for HostRegistrar {
    fn register(&self, record: PluginRecord) -> Result<ExecutorHandle, IngestError> {
        if !Engine::same(record.module().engine(), self.manager.engine()) {
            return Err(IngestError::HostRegistration(format!(
                "module for '{}' was compiled with a foreign engine",
                record.id()
            )));
        }

        let plugin_id = record.id().to_string();
        let metadata = Arc::new(host_metadata(record));
        let executor = PluginExecutor::new(metadata, Special::None, self.manager.fuel_per_hook());

        let list = internals::plugin_list(&self.manager).ok_or_else(|| {
            IngestError::HostRegistration("host plugin list disappeared".to_string())
        })?;
        let mut list = list.lock();
        list.push(executor);
        let slot = list.len() - 1;
        debug!(plugin_id = %plugin_id, slot, "Executor appended to host plugin list");

        // No rollback: a failing create/enable leaves the executor in the list.
        let executor = &mut list[slot];
        executor.create()?;
        executor.enable()?;

        Ok(ExecutorHandle { plugin_id, slot })
    }

    fn soft_restart(&self) {
        self.manager.soft_restart();
    }
}

fn host_metadata(record: PluginRecord) -> PluginMetadata {
    let PluginRecord {
        manifest,
        entry_type,
        module,
        is_self,
        source_location,
    } = record;

    PluginMetadata {
        manifest: PluginManifest {
            id: manifest.effective_id().to_string(),
            name: manifest.name,
            version: manifest.version,
        },
        plugin_type: entry_type.full_name,
        runtime_options: entry_type.runtime_options,
        module,
        is_self,
        file: source_location,
    }
}
