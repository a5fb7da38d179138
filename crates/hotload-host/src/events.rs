//! Host lifecycle events broadcast to interested listeners.

/// Events emitted by the [`PluginManager`](crate::PluginManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The host finished startup and its plugin list is available.
    Started,
    /// The scene lifecycle was re-entered without ending the process.
    SoftRestart {
        /// Monotonic restart counter, starting at 1.
        generation: u64,
    },
}
