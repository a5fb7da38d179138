//! Plugin record assembly.

use std::path::PathBuf;

use tracing::debug;
use wasmtime::Module;

use crate::error::IngestError;
use crate::manifest::Manifest;
use crate::metadata::RawPluginMetadata;
use crate::record::PluginRecord;

/// Combines metadata-read outputs with the compiled module.
///
/// The manifest is parsed here, not by the reader, and its id is resolved
/// before anything else sees it. Declared dependencies are carried along
/// but never evaluated.
pub fn assemble(
    raw: RawPluginMetadata,
    module: Module,
    source_location: Option<PathBuf>,
) -> Result<PluginRecord, IngestError> {
    let manifest = Manifest::from_resource(&raw.resource_name, &raw.manifest_bytes)?;

    let entry_type = raw.entry_type.ok_or_else(|| {
        IngestError::InvariantViolation(format!(
            "metadata for '{}' reached assembly without an entry type",
            manifest.effective_id()
        ))
    })?;

    debug!(
        plugin_id = %manifest.effective_id(),
        entry_type = %entry_type.full_name,
        runtime_options = %entry_type.runtime_options,
        "Plugin record assembled"
    );

    Ok(PluginRecord {
        manifest,
        entry_type,
        module,
        is_self: false,
        source_location,
    })
}
