//! The ingestion pipeline: read, compile, assemble, hand off.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};
use wasmtime::{Engine, Module};

use crate::assembler::assemble;
use crate::bridge::{ExecutorHandle, HostBridge};
use crate::error::IngestError;
use crate::metadata::{MetadataReader, ModuleSource};
use crate::record::PluginRecord;

/// Runs one module through every ingestion stage, synchronously.
pub struct IngestionPipeline {
    reader: MetadataReader,
    engine: Engine,
    bridge: HostBridge,
}

impl IngestionPipeline {
    /// `engine` must be the host's engine; records compiled with another
    /// engine are refused at registration.
    pub fn new(reader: MetadataReader, engine: Engine, bridge: HostBridge) -> Self {
        Self {
            reader,
            engine,
            bridge,
        }
    }

    pub fn bridge(&self) -> &HostBridge {
        &self.bridge
    }

    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<ExecutorHandle, IngestError> {
        self.load(ModuleSource::file(path.as_ref()))
    }

    pub fn load_from_bytes(&self, bytes: Vec<u8>) -> Result<ExecutorHandle, IngestError> {
        self.load(ModuleSource::Bytes(bytes))
    }

    pub fn load_from_stream(
        &self,
        reader: impl Read + Send + 'static,
    ) -> Result<ExecutorHandle, IngestError> {
        self.load(ModuleSource::stream(reader))
    }

    /// Ingests a module and hands it to the host.
    pub fn load(&self, source: ModuleSource) -> Result<ExecutorHandle, IngestError> {
        let record = self.prepare(source)?;
        info!(
            plugin_id = %record.id(),
            entry_type = %record.entry_type().full_name,
            "Handing plugin to host"
        );
        self.bridge.handoff(record)
    }

    /// Builds a record without touching the host.
    pub fn prepare(&self, source: ModuleSource) -> Result<PluginRecord, IngestError> {
        let location = source.location().map(Path::to_path_buf);
        let bytes = source.into_bytes()?;
        debug!(path = ?location, size = bytes.len(), "Module bytes read");

        let raw = self.reader.read_plugin(&bytes)?;
        let module = Module::from_binary(&self.engine, &bytes).map_err(IngestError::Compile)?;
        assemble(raw, module, location)
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("reader", &self.reader)
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}
