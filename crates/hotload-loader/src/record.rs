//! Assembled plugin records.

use std::path::{Path, PathBuf};

use hotload_core::types::RuntimeOptions;
use wasmtime::Module;

use crate::manifest::Manifest;

/// The plugin entry type found in a module's type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTypeDescriptor {
    /// Namespace-qualified type name; prefixes lifecycle export names.
    pub full_name: String,
    /// Value carried by the entry marker.
    pub runtime_options: RuntimeOptions,
}

/// A fully assembled plugin, ready to hand to the host.
///
/// Only the assembler constructs records, and nothing mutates them
/// afterwards.
#[derive(Debug, Clone)]
pub struct PluginRecord {
    pub(crate) manifest: Manifest,
    pub(crate) entry_type: EntryTypeDescriptor,
    pub(crate) module: Module,
    pub(crate) is_self: bool,
    pub(crate) source_location: Option<PathBuf>,
}

impl PluginRecord {
    /// Effective plugin id.
    pub fn id(&self) -> &str {
        self.manifest.effective_id()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn entry_type(&self) -> &EntryTypeDescriptor {
        &self.entry_type
    }

    pub fn runtime_options(&self) -> RuntimeOptions {
        self.entry_type.runtime_options
    }

    /// Compiled module from the executing load.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Always `false` for dynamically ingested modules.
    pub fn is_self(&self) -> bool {
        self.is_self
    }

    pub fn source_location(&self) -> Option<&Path> {
        self.source_location.as_deref()
    }
}
