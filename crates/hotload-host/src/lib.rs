//! # hotload-host
//!
//! In-process plugin-execution host. Provides:
//!
//! - Host-native plugin metadata records
//! - Executors driving a plugin's create/enable/disable lifecycle
//! - The plugin manager owning the internal executor list
//! - Soft restart of the scene lifecycle with host event broadcast
//!
//! The manager deliberately offers no public way to append executors after
//! startup; see [`internals`].

pub mod error;
pub mod events;
pub mod executor;
pub mod internals;
pub mod manager;
pub mod metadata;

pub use error::HostError;
pub use events::HostEvent;
pub use executor::{ExecutorState, PluginExecutor, Special};
pub use manager::PluginManager;
pub use metadata::{PluginManifest, PluginMetadata};
