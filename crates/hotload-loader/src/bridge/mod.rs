//! Bridge between assembled records and the plugin-execution host.
//!
//! The pipeline only ever talks to a [`PluginRegistrar`]. The one
//! implementation that touches host internals is [`HostRegistrar`].

mod host;

use std::sync::Arc;

use tracing::info;

pub use host::HostRegistrar;

use crate::error::IngestError;
use crate::record::PluginRecord;
use crate::tracking::LoadTracker;

/// Where a registered plugin's executor ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorHandle {
    /// Effective plugin id.
    pub plugin_id: String,
    /// Position in the host's executor list.
    pub slot: usize,
}

/// Registers plugin records with a host.
pub trait PluginRegistrar: Send + Sync {
    /// Wraps `record` in an executor, adds it to the host and runs its
    /// create and enable steps, in that order.
    ///
    /// Takes ownership; the caller keeps no reference to the record.
    fn register(&self, record: PluginRecord) -> Result<ExecutorHandle, IngestError>;

    /// Re-enters the host's scene lifecycle.
    fn soft_restart(&self);
}

/// Hands records to a registrar and records successful loads.
pub struct HostBridge {
    registrar: Arc<dyn PluginRegistrar>,
    tracker: Arc<LoadTracker>,
}

impl HostBridge {
    pub fn new(registrar: Arc<dyn PluginRegistrar>, tracker: Arc<LoadTracker>) -> Self {
        Self { registrar, tracker }
    }

    pub fn tracker(&self) -> &Arc<LoadTracker> {
        &self.tracker
    }

    /// Registers `record`, tracks its id and triggers a soft restart.
    ///
    /// A registration failure is returned as is. Whatever the registrar
    /// already added to the host stays there.
    pub fn handoff(&self, record: PluginRecord) -> Result<ExecutorHandle, IngestError> {
        let handle = self.registrar.register(record)?;
        self.tracker.record(handle.plugin_id.clone());

        info!(
            plugin_id = %handle.plugin_id,
            slot = handle.slot,
            "Plugin loaded, requesting soft restart"
        );
        self.registrar.soft_restart();
        Ok(handle)
    }
}

impl std::fmt::Debug for HostBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBridge")
            .field("tracked", &self.tracker.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use crate::metadata::RawPluginMetadata;
    use crate::record::EntryTypeDescriptor;
    use hotload_core::types::RuntimeOptions;
    use parking_lot::Mutex;
    use wasmtime::{Engine, Module};

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl PluginRegistrar for Recording {
        fn register(&self, record: PluginRecord) -> Result<ExecutorHandle, IngestError> {
            self.calls.lock().push(format!("register:{}", record.id()));
            if self.fail {
                return Err(IngestError::HostRegistration("rejected".to_string()));
            }
            Ok(ExecutorHandle {
                plugin_id: record.id().to_string(),
                slot: 0,
            })
        }

        fn soft_restart(&self) {
            self.calls.lock().push("soft_restart".to_string());
        }
    }

    fn record(manifest: &str) -> PluginRecord {
        let raw = RawPluginMetadata {
            resource_name: "Foo.manifest.json".to_string(),
            namespace: "Foo".to_string(),
            manifest_bytes: manifest.as_bytes().to_vec(),
            entry_type: Some(EntryTypeDescriptor {
                full_name: "Foo.Plugin".to_string(),
                runtime_options: RuntimeOptions::SingleStartInit,
            }),
        };
        let module = Module::new(&Engine::default(), "(module)").unwrap();
        assemble(raw, module, None).unwrap()
    }

    #[test]
    fn test_handoff_registers_tracks_then_restarts() {
        let registrar = Arc::new(Recording::default());
        let tracker = Arc::new(LoadTracker::new());
        let bridge = HostBridge::new(registrar.clone(), tracker.clone());

        let handle = bridge.handoff(record(r#"{"name":"Foo Mod"}"#)).unwrap();

        assert_eq!(handle.plugin_id, "Foo Mod");
        assert_eq!(tracker.snapshot(), vec!["Foo Mod"]);
        assert_eq!(*registrar.calls.lock(), vec!["register:Foo Mod", "soft_restart"]);
    }

    #[test]
    fn test_failed_registration_is_not_tracked() {
        let registrar = Arc::new(Recording {
            fail: true,
            ..Default::default()
        });
        let tracker = Arc::new(LoadTracker::new());
        let bridge = HostBridge::new(registrar.clone(), tracker.clone());

        let err = bridge.handoff(record(r#"{"id":"bar","name":"Bar"}"#)).unwrap_err();

        assert!(matches!(err, IngestError::HostRegistration(_)));
        assert!(tracker.is_empty());
        assert_eq!(*registrar.calls.lock(), vec!["register:bar"]);
    }
}
