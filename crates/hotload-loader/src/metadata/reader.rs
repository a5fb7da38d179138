//! Static metadata reader.

use std::path::PathBuf;

use tracing::{debug, warn};
use wasmparser::{Encoding, ExternalKind, Parser, Payload};

use super::discovery::{find_entry_type, find_manifest};
use super::format::TYPE_TABLE_SECTION;
use super::resolver::ImportResolver;
use super::{EmbeddedResource, ImportReference, ModuleMetadata, format};
use crate::error::IngestError;
use crate::record::EntryTypeDescriptor;

/// Outputs of a metadata-only read that the assembler consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPluginMetadata {
    /// Name of the manifest resource.
    pub resource_name: String,
    /// Namespace derived from the resource name.
    pub namespace: String,
    /// Manifest resource payload.
    pub manifest_bytes: Vec<u8>,
    /// Discovered entry type.
    pub entry_type: Option<EntryTypeDescriptor>,
}

/// Reads module metadata without compiling or instantiating the module.
#[derive(Debug, Clone, Default)]
pub struct MetadataReader {
    resolver: ImportResolver,
}

impl MetadataReader {
    pub fn new(resolver: ImportResolver) -> Self {
        Self { resolver }
    }

    /// Reader resolving imports against `search_dirs`, in order.
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self::new(ImportResolver::new(search_dirs))
    }

    pub fn resolver(&self) -> &ImportResolver {
        &self.resolver
    }

    /// Parses embedded resources, the type table, imports and exports.
    ///
    /// Unresolved imports are recorded and never fail the read.
    pub fn read(&self, bytes: &[u8]) -> Result<ModuleMetadata, IngestError> {
        let mut metadata = ModuleMetadata::default();
        let mut saw_type_table = false;

        for payload in Parser::new(0).parse_all(bytes) {
            match payload? {
                Payload::Version {
                    encoding: Encoding::Component,
                    ..
                } => {
                    return Err(IngestError::MalformedModule(
                        "components are not supported, expected a core module".to_string(),
                    ));
                }
                Payload::CustomSection(reader) if reader.name() == TYPE_TABLE_SECTION => {
                    if saw_type_table {
                        warn!(section = TYPE_TABLE_SECTION, "Ignoring duplicate type table section");
                        continue;
                    }
                    metadata.types = format::decode_type_table(reader.data(), reader.data_offset())?;
                    saw_type_table = true;
                }
                Payload::CustomSection(reader) => {
                    metadata.resources.push(EmbeddedResource {
                        name: reader.name().to_string(),
                        data: reader.data().to_vec(),
                    });
                }
                Payload::ImportSection(section) => {
                    for import in section {
                        let import = import?;
                        let resolved = self.resolver.resolve(import.module);
                        if resolved.is_none() {
                            debug!(
                                module = %import.module,
                                name = %import.name,
                                "Import not found in search directories"
                            );
                        }
                        metadata.imports.push(ImportReference {
                            module: import.module.to_string(),
                            name: import.name.to_string(),
                            resolved,
                        });
                    }
                }
                Payload::ExportSection(section) => {
                    for export in section {
                        let export = export?;
                        if export.kind == ExternalKind::Func {
                            metadata.exports.push(export.name.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(metadata)
    }

    /// Reads a module and locates its manifest resource and entry type.
    pub fn read_plugin(&self, bytes: &[u8]) -> Result<RawPluginMetadata, IngestError> {
        let metadata = self.read(bytes)?;
        let manifest = find_manifest(&metadata.resources)?;
        let entry_type = find_entry_type(&metadata.types, manifest.namespace)?;

        debug!(
            resource = %manifest.name,
            namespace = %manifest.namespace,
            entry_type = %entry_type.full_name,
            "Plugin metadata read"
        );

        Ok(RawPluginMetadata {
            resource_name: manifest.name.to_string(),
            namespace: manifest.namespace.to_string(),
            manifest_bytes: manifest.data.to_vec(),
            entry_type: Some(entry_type),
        })
    }
}
