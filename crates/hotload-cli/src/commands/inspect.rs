//! Static inspection of plugin modules.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use hotload_core::error::AppError;
use hotload_core::result::AppResult;
use hotload_core::types::RuntimeOptions;
use hotload_loader::Manifest;
use hotload_loader::metadata::discovery::{entry_marker, find_entry_type, find_manifest};
use hotload_loader::metadata::{ImportReference, MetadataReader, TypeDefinition};

/// Arguments for the inspect command
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Module file to inspect
    pub module: PathBuf,
}

/// Everything a static read can tell about a module
#[derive(Debug, Serialize)]
struct InspectReport {
    path: String,
    manifest_resource: Option<String>,
    namespace: Option<String>,
    manifest: Option<Manifest>,
    entry_type: Option<String>,
    runtime_options: Option<String>,
    problems: Vec<String>,
    search_dirs: Vec<String>,
    types: Vec<TypeRow>,
    imports: Vec<ImportRow>,
    exports: Vec<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Attributes")]
    attributes: String,
    #[tabled(rename = "Entry marker")]
    marker: String,
}

impl From<&TypeDefinition> for TypeRow {
    fn from(ty: &TypeDefinition) -> Self {
        Self {
            name: ty.full_name.clone(),
            namespace: ty.namespace().to_string(),
            attributes: ty
                .attributes
                .iter()
                .map(|a| a.attribute_type.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            marker: entry_marker(ty)
                .map(|value| match RuntimeOptions::try_from(value) {
                    Ok(options) => options.to_string(),
                    Err(value) => format!("unknown ({value})"),
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ImportRow {
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resolved")]
    resolved: String,
}

impl From<&ImportReference> for ImportRow {
    fn from(import: &ImportReference) -> Self {
        Self {
            module: import.module.clone(),
            name: import.name.clone(),
            resolved: import
                .resolved
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute the inspect command
pub async fn execute(
    args: &InspectArgs,
    config_path: &str,
    format: OutputFormat,
) -> AppResult<()> {
    let config = super::load_config(config_path)?;
    let bytes = super::read_input(&args.module).await?;

    let reader = MetadataReader::with_search_dirs(config.loader.search_dirs());
    let metadata = reader.read(&bytes)?;

    let mut report = InspectReport {
        path: args.module.display().to_string(),
        manifest_resource: None,
        namespace: None,
        manifest: None,
        entry_type: None,
        runtime_options: None,
        problems: Vec::new(),
        search_dirs: reader
            .resolver()
            .search_dirs()
            .iter()
            .map(|dir| dir.display().to_string())
            .collect(),
        types: metadata.types.iter().map(TypeRow::from).collect(),
        imports: metadata.imports.iter().map(ImportRow::from).collect(),
        exports: metadata.exports.clone(),
    };

    match find_manifest(&metadata.resources) {
        Ok(resource) => {
            report.manifest_resource = Some(resource.name.to_string());
            report.namespace = Some(resource.namespace.to_string());

            match Manifest::from_resource(resource.name, resource.data) {
                Ok(manifest) => report.manifest = Some(manifest),
                Err(e) => report.problems.push(e.to_string()),
            }
            match find_entry_type(&metadata.types, resource.namespace) {
                Ok(entry) => {
                    report.entry_type = Some(entry.full_name);
                    report.runtime_options = Some(entry.runtime_options.to_string());
                }
                Err(e) => report.problems.push(e.to_string()),
            }
        }
        Err(e) => report.problems.push(e.to_string()),
    }

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => print_report(&report),
    }

    if report.problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::plugin(format!(
            "'{}' is not a loadable plugin module",
            report.path
        )))
    }
}

fn print_report(report: &InspectReport) {
    let none = "-".to_string();
    println!("Module {}", report.path);
    output::print_kv(
        "Manifest resource",
        report.manifest_resource.as_ref().unwrap_or(&none),
    );
    output::print_kv("Namespace", report.namespace.as_ref().unwrap_or(&none));
    if let Some(manifest) = &report.manifest {
        output::print_kv("Plugin id", manifest.effective_id());
        output::print_kv("Name", &manifest.name);
        output::print_kv("Version", manifest.version.as_ref().unwrap_or(&none));
        if !manifest.depends_on.is_empty() {
            let deps: Vec<String> = manifest
                .depends_on
                .iter()
                .map(|(id, range)| format!("{id} {range}"))
                .collect();
            output::print_kv("Depends on (unused)", &deps.join(", "));
        }
    }
    output::print_kv("Entry type", report.entry_type.as_ref().unwrap_or(&none));
    output::print_kv(
        "Runtime options",
        report.runtime_options.as_ref().unwrap_or(&none),
    );
    output::print_kv("Exported functions", &report.exports.len().to_string());
    output::print_kv("Import search dirs", &report.search_dirs.join(", "));
    println!();

    output::print_table("Types", &report.types);
    output::print_table("Imports", &report.imports);

    for problem in &report.problems {
        output::print_warning(problem);
    }
}
