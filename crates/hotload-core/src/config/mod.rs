//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! via the `config` crate, overlaid by `HOTLOAD__*` environment variables.
//! Each sub-module represents a logical configuration section.

pub mod host;
pub mod loader;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::host::HostConfig;
pub use self::loader::LoaderConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Dynamic module ingestion settings.
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Reference host settings.
    #[serde(default)]
    pub host: HostConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; every field has a default. Environment
    /// variables use the `HOTLOAD` prefix and `__` as section separator,
    /// e.g. `HOTLOAD__LOADER__WATCH_FOLDER=false`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from(std::path::Path::new(path)).required(false))
            .add_source(
                config::Environment::with_prefix("HOTLOAD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.loader.extension.trim().is_empty() {
            return Err(AppError::validation("loader.extension must not be empty"));
        }
        if self.loader.tick_interval_ms == 0 {
            return Err(AppError::validation("loader.tick_interval_ms must be positive"));
        }
        if self.loader.instance_name.trim().is_empty() {
            return Err(AppError::validation("loader.instance_name must not be empty"));
        }
        if self.host.event_capacity == 0 {
            return Err(AppError::validation("host.event_capacity must be positive"));
        }
        Ok(())
    }
}
