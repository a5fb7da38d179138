//! CLI command definitions and dispatch.

pub mod bundle;
pub mod config;
pub mod inspect;
pub mod load;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use hotload_core::config::AppConfig;
use std::io::ErrorKind;
use std::path::Path;

use hotload_core::error::AppError;
use hotload_core::result::AppResult;

/// Hotload: inspect, bundle and test-load WebAssembly plugin modules
#[derive(Debug, Parser)]
#[command(name = "hotload", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Statically inspect a plugin module without running it
    Inspect(inspect::InspectArgs),
    /// Embed a manifest and type table into a compiled module
    Bundle(bundle::BundleArgs),
    /// Ingest modules into a fresh in-process host and report the result
    Load(load::LoadArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> AppResult<()> {
        match &self.command {
            Commands::Inspect(args) => inspect::execute(args, &self.config, self.format).await,
            Commands::Bundle(args) => bundle::execute(args).await,
            Commands::Load(args) => load::execute(args, &self.config, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load and validate configuration from file
pub fn load_config(config_path: &str) -> AppResult<AppConfig> {
    let config = AppConfig::load(config_path)?;
    config.validate()?;
    Ok(config)
}

/// Helper: read an input file, reporting a missing file as not found
pub async fn read_input(path: &Path) -> AppResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::not_found(format!("'{}' does not exist", path.display())),
        _ => AppError::from(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotload_core::error::ErrorKind as AppErrorKind;

    #[tokio::test]
    async fn test_missing_input_is_not_found() {
        let path = std::env::temp_dir().join("hotload-cli-missing-input.wasm");
        let err = read_input(&path).await.unwrap_err();
        assert_eq!(err.kind, AppErrorKind::NotFound);
    }
}
