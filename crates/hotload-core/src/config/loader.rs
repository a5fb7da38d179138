//! Dynamic module ingestion configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings consumed once at startup by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Enables the whole ingestion feature.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Enables the plugins-folder watch producer.
    #[serde(default = "default_true")]
    pub watch_folder: bool,
    /// Watched plugins directory; also a metadata search directory.
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: String,
    /// Host library directory used to resolve module imports.
    #[serde(default = "default_library_dir")]
    pub library_dir: String,
    /// File extension of ingestible modules, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Host tick cadence in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Name under which this loader's tracking registry is published.
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
}

impl LoaderConfig {
    /// Metadata search directories, in resolution order.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        vec![
            PathBuf::from(&self.library_dir),
            PathBuf::from(&self.plugins_dir),
        ]
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            watch_folder: true,
            plugins_dir: default_plugins_dir(),
            library_dir: default_library_dir(),
            extension: default_extension(),
            tick_interval_ms: default_tick_interval(),
            instance_name: default_instance_name(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_plugins_dir() -> String {
    "./Plugins".to_string()
}

fn default_library_dir() -> String {
    "./Libs".to_string()
}

fn default_extension() -> String {
    "wasm".to_string()
}

fn default_tick_interval() -> u64 {
    16
}

fn default_instance_name() -> String {
    "HotLoader".to_string()
}
