//! Shared fixtures for loader integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use hotload_core::config::HostConfig;
use hotload_core::types::RuntimeOptions;
use hotload_host::PluginManager;
use hotload_loader::metadata::TypeDefinition;
use hotload_loader::metadata::format::{self, plugin_attribute};
use hotload_loader::{
    HostBridge, HostRegistrar, IngestionConsumer, IngestionPipeline, IngestionQueue, LoadTracker,
    MetadataReader,
};
use tempfile::TempDir;

/// A started host with a loader wired to it, plus a scratch plugins folder.
pub struct TestHost {
    pub plugins_dir: TempDir,
    pub manager: Arc<PluginManager>,
    pub tracker: Arc<LoadTracker>,
    pub queue: IngestionQueue,
    pub consumer: IngestionConsumer,
}

impl TestHost {
    pub fn new() -> Self {
        let plugins_dir = tempfile::tempdir().unwrap();

        let manager = Arc::new(PluginManager::new(HostConfig::default()).unwrap());
        manager.start();

        let registrar = HostRegistrar::bind(Arc::clone(&manager)).unwrap();
        let tracker = Arc::new(LoadTracker::new());
        let bridge = HostBridge::new(Arc::new(registrar), Arc::clone(&tracker));
        let reader = MetadataReader::with_search_dirs(vec![plugins_dir.path().to_path_buf()]);
        let pipeline = IngestionPipeline::new(reader, manager.engine().clone(), bridge);

        let queue = IngestionQueue::new();
        let consumer = IngestionConsumer::new(queue.clone(), pipeline);

        Self {
            plugins_dir,
            manager,
            tracker,
            queue,
            consumer,
        }
    }

    /// Writes a module into the plugins folder.
    pub fn write_module(&self, file_name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.plugins_dir.path().join(file_name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn pipeline(&self) -> &IngestionPipeline {
        self.consumer.pipeline()
    }
}

/// Builds a plugin module from text plus embedded metadata sections.
pub struct ModuleBuilder {
    wat: String,
    manifest: Option<(String, String)>,
    types: Vec<TypeDefinition>,
}

impl ModuleBuilder {
    pub fn new(wat: impl Into<String>) -> Self {
        Self {
            wat: wat.into(),
            manifest: None,
            types: Vec::new(),
        }
    }

    /// A module whose entry type `entry` counts its lifecycle hook calls.
    pub fn counting(entry: &str) -> Self {
        Self::new(counting_wat(entry))
    }

    pub fn manifest(mut self, namespace: &str, json: &str) -> Self {
        self.manifest = Some((namespace.to_string(), json.to_string()));
        self
    }

    pub fn entry_type(mut self, full_name: &str, options: RuntimeOptions) -> Self {
        self.types
            .push(TypeDefinition::new(full_name, vec![plugin_attribute(options)]));
        self
    }

    pub fn plain_type(mut self, full_name: &str) -> Self {
        self.types.push(TypeDefinition::new(full_name, vec![]));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = wat::parse_str(&self.wat).unwrap();
        if let Some((namespace, json)) = &self.manifest {
            format::append_custom_section(
                &mut bytes,
                &format!("{namespace}{}", format::MANIFEST_SUFFIX),
                json.as_bytes(),
            );
        }
        if !self.types.is_empty() {
            format::append_custom_section(
                &mut bytes,
                format::TYPE_TABLE_SECTION,
                &format::encode_type_table(&self.types),
            );
        }
        bytes
    }
}

pub fn counting_wat(entry: &str) -> String {
    format!(
        r#"(module
             (global $count (export "count") (mut i32) (i32.const 0))
             (func (export "{entry}.init")
               global.get $count i32.const 1 i32.add global.set $count)
             (func (export "{entry}.on_enable")
               global.get $count i32.const 10 i32.add global.set $count)
             (func (export "{entry}.on_scene_start")
               global.get $count i32.const 100 i32.add global.set $count))"#
    )
}

/// Scenario A module: `{"name":"Foo Mod"}` with entry type `Foo.Plugin`.
pub fn foo_module() -> Vec<u8> {
    ModuleBuilder::counting("Foo.Plugin")
        .manifest("Foo", r#"{"name":"Foo Mod"}"#)
        .plain_type("Foo.Helpers")
        .entry_type("Foo.Plugin", RuntimeOptions::SingleStartInit)
        .build()
}

/// Scenario B module: manifest but no marked type anywhere.
pub fn bar_module() -> Vec<u8> {
    ModuleBuilder::counting("Bar.Plugin")
        .manifest("Bar", r#"{"id":"bar","name":"Bar"}"#)
        .plain_type("Bar.Plugin")
        .plain_type("Bar.Other")
        .build()
}
