//! Host error types.

use hotload_core::error::{AppError, ErrorKind};

use crate::executor::ExecutorState;

/// Errors raised by the plugin-execution host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The wasmtime engine could not be configured.
    #[error("failed to configure engine: {0}")]
    Engine(#[source] wasmtime::Error),

    /// The module could not be instantiated.
    #[error("failed to instantiate plugin '{plugin}': {source}")]
    Instantiate {
        /// Plugin id.
        plugin: String,
        /// Underlying wasmtime failure.
        #[source]
        source: wasmtime::Error,
    },

    /// A lifecycle hook trapped, ran out of fuel or had the wrong signature.
    #[error("lifecycle hook '{hook}' of plugin '{plugin}' failed: {source}")]
    Hook {
        /// Plugin id.
        plugin: String,
        /// Hook export suffix (e.g. `on_enable`).
        hook: &'static str,
        /// Underlying wasmtime failure.
        #[source]
        source: wasmtime::Error,
    },

    /// A lifecycle call is not valid in the executor's current state.
    #[error("plugin '{plugin}' cannot {operation} while {state}")]
    InvalidState {
        /// Plugin id.
        plugin: String,
        /// Attempted operation.
        operation: &'static str,
        /// State the executor was in.
        state: ExecutorState,
    },
}

impl From<HostError> for AppError {
    fn from(err: HostError) -> Self {
        AppError::with_source(ErrorKind::Host, err.to_string(), err)
    }
}
