//! Host-native plugin metadata.

use std::path::PathBuf;

use hotload_core::types::RuntimeOptions;
use wasmtime::Module;

/// Identity of a plugin as the host stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    /// Resolved plugin id; never empty.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Declared version, if any.
    pub version: Option<String>,
}

/// Everything the host needs to run a plugin.
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    /// Plugin identity.
    pub manifest: PluginManifest,
    /// Full name of the entry type; prefixes lifecycle export names.
    pub plugin_type: String,
    /// Allowed lifecycle invocation mode.
    pub runtime_options: RuntimeOptions,
    /// Compiled module.
    pub module: Module,
    /// Whether this record describes the host-side loader itself.
    pub is_self: bool,
    /// File the module was read from.
    pub file: Option<PathBuf>,
}

impl PluginMetadata {
    /// Export name of a lifecycle hook on the entry type.
    pub fn hook_export(&self, hook: &str) -> String {
        format!("{}.{}", self.plugin_type, hook)
    }

    /// Shorthand for the plugin id.
    pub fn id(&self) -> &str {
        &self.manifest.id
    }
}
