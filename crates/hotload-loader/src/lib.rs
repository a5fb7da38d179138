//! # hotload-loader
//!
//! Ingests WebAssembly plugin modules into a running host. Provides:
//!
//! - Metadata-only inspection of a module (manifest resource, type table,
//!   imports) that never instantiates or runs guest code
//! - Entry type discovery through a declarative plugin marker
//! - Assembly of an immutable [`PluginRecord`]
//! - A host bridge that registers records with the plugin-execution host
//! - A multi-producer queue drained one path per host tick
//! - A plugins-folder watcher feeding that queue
//! - A process-wide registry of plugin ids this loader has loaded

pub mod assembler;
pub mod bridge;
pub mod consumer;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod queue;
pub mod record;
pub mod tracking;
pub mod watcher;

pub use bridge::{ExecutorHandle, HostBridge, HostRegistrar, PluginRegistrar};
pub use consumer::{IngestionConsumer, TickOutcome};
pub use error::{IngestError, IngestErrorKind};
pub use manifest::Manifest;
pub use metadata::{MetadataReader, ModuleMetadata, ModuleSource};
pub use pipeline::IngestionPipeline;
pub use queue::IngestionQueue;
pub use record::{EntryTypeDescriptor, PluginRecord};
pub use tracking::{LoadTracker, TrackerDirectory};
pub use watcher::FolderWatcher;
