//! Embedding plugin metadata into compiled modules.

use std::path::PathBuf;

use clap::Args;

use crate::output;
use hotload_core::error::AppError;
use hotload_core::result::AppResult;
use hotload_core::types::RuntimeOptions;
use hotload_loader::Manifest;
use hotload_loader::metadata::MetadataReader;
use hotload_loader::metadata::TypeDefinition;
use hotload_loader::metadata::discovery::find_manifest;
use hotload_loader::metadata::format::{self, MANIFEST_SUFFIX, plugin_attribute};

/// Arguments for the bundle command
#[derive(Debug, Args)]
pub struct BundleArgs {
    /// Compiled module (.wasm) or WebAssembly text (.wat)
    pub input: PathBuf,

    /// Where to write the bundled module
    #[arg(short, long)]
    pub output: PathBuf,

    /// Manifest JSON file to embed
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Full name of the plugin entry type, e.g. `Foo.Plugin`
    #[arg(short, long)]
    pub entry: String,

    /// Lifecycle mode declared by the entry marker
    #[arg(long, value_enum, default_value = "single-start-init")]
    pub runtime_options: RuntimeOptionsArg,

    /// Namespace for the manifest resource (defaults to the entry type's)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Additional unmarked types to list in the type table
    #[arg(long = "type")]
    pub types: Vec<String>,
}

/// Runtime options as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RuntimeOptionsArg {
    /// Enabled once, never disabled
    SingleStartInit,
    /// May be enabled and disabled repeatedly
    DynamicInit,
}

impl From<RuntimeOptionsArg> for RuntimeOptions {
    fn from(arg: RuntimeOptionsArg) -> Self {
        match arg {
            RuntimeOptionsArg::SingleStartInit => RuntimeOptions::SingleStartInit,
            RuntimeOptionsArg::DynamicInit => RuntimeOptions::DynamicInit,
        }
    }
}

/// Execute the bundle command
pub async fn execute(args: &BundleArgs) -> AppResult<()> {
    let module = wat::parse_file(&args.input).map_err(|e| {
        AppError::validation(format!("Failed to read module '{}': {e}", args.input.display()))
    })?;
    let manifest_json = super::read_input(&args.manifest).await?;

    let bundled = bundle_module(
        module,
        &manifest_json,
        &args.entry,
        args.runtime_options.into(),
        args.namespace.as_deref(),
        &args.types,
    )?;

    let exports = MetadataReader::default().read(&bundled)?.exports;
    let prefix = format!("{}.", args.entry);
    if !exports.iter().any(|name| name.starts_with(&prefix)) {
        output::print_warning(&format!(
            "Module exports no lifecycle hooks for '{}'",
            args.entry
        ));
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&args.output, &bundled).await?;

    output::print_success(&format!(
        "Bundled '{}' with entry '{}' into '{}'",
        args.input.display(),
        args.entry,
        args.output.display()
    ));
    Ok(())
}

/// Appends the manifest and type table to `module` and verifies the result
/// reads back as a plugin.
pub fn bundle_module(
    mut module: Vec<u8>,
    manifest_json: &[u8],
    entry: &str,
    options: RuntimeOptions,
    namespace: Option<&str>,
    extra_types: &[String],
) -> AppResult<Vec<u8>> {
    let reader = MetadataReader::default();
    let existing = reader.read(&module)?;
    if find_manifest(&existing.resources).is_ok() || !existing.types.is_empty() {
        return Err(AppError::validation("Module already carries plugin metadata"));
    }

    let entry_type = TypeDefinition::new(entry, vec![plugin_attribute(options)]);
    let namespace = namespace.unwrap_or(entry_type.namespace());
    if namespace.is_empty() {
        return Err(AppError::validation(format!(
            "Entry type '{entry}' has no namespace; use a qualified name like 'Foo.Plugin'"
        )));
    }
    if entry_type.namespace() != namespace {
        return Err(AppError::validation(format!(
            "Entry type '{entry}' is outside namespace '{namespace}' and would never be found"
        )));
    }

    Manifest::from_resource(&format!("{namespace}{MANIFEST_SUFFIX}"), manifest_json)?;

    let mut types = vec![entry_type.clone()];
    types.extend(extra_types.iter().map(|name| TypeDefinition::new(name.as_str(), vec![])));
    format::embed_plugin_metadata(&mut module, namespace, manifest_json, &types);

    reader.read_plugin(&module)?;
    Ok(module)
}
