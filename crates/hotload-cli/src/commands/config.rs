//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use hotload_core::result::AppResult;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (file + environment)
    Show,
    /// Validate the configuration file
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => {
                    println!("Loader:");
                    output::print_kv("Enabled", &config.loader.enabled.to_string());
                    output::print_kv("Watch folder", &config.loader.watch_folder.to_string());
                    output::print_kv("Plugins dir", &config.loader.plugins_dir);
                    output::print_kv("Library dir", &config.loader.library_dir);
                    output::print_kv("Extension", &config.loader.extension);
                    output::print_kv("Tick (ms)", &config.loader.tick_interval_ms.to_string());
                    output::print_kv("Instance", &config.loader.instance_name);
                    println!("Host:");
                    output::print_kv("Fuel per hook", &config.host.fuel_per_hook.to_string());
                    output::print_kv("Event capacity", &config.host.event_capacity.to_string());
                    println!("Logging:");
                    output::print_kv("Level", &config.logging.level);
                    output::print_kv("Format", &config.logging.format);
                }
            }
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                if !std::path::Path::new(config_path).exists() {
                    output::print_warning("File not found, built-in defaults were used");
                }
                output::print_kv("Loader enabled", &config.loader.enabled.to_string());
                output::print_kv("Plugins dir", &config.loader.plugins_dir);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
