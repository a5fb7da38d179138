//! Reference host configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-process plugin-execution host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Fuel granted to each lifecycle hook invocation.
    #[serde(default = "default_fuel")]
    pub fuel_per_hook: u64,
    /// Capacity of the host event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            fuel_per_hook: default_fuel(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_fuel() -> u64 {
    10_000_000
}

fn default_event_capacity() -> usize {
    64
}
