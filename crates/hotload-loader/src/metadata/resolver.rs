//! Resolution of imported module names against search directories.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolves an import's module name to `<dir>/<name>.wasm` in the first
/// search directory containing it.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    search_dirs: Vec<PathBuf>,
}

impl ImportResolver {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Path of the module providing `module_name`, if any.
    ///
    /// Names that would escape a search directory never resolve.
    pub fn resolve(&self, module_name: &str) -> Option<PathBuf> {
        if !is_plain_name(module_name) {
            debug!(module = %module_name, "Import name is not a plain file name");
            return None;
        }

        let file_name = format!("{module_name}.wasm");
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).is_relative()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_search_dir_wins() {
        let libs = tempfile::tempdir().unwrap();
        let plugins = tempfile::tempdir().unwrap();
        std::fs::write(libs.path().join("shared.wasm"), b"").unwrap();
        std::fs::write(plugins.path().join("shared.wasm"), b"").unwrap();
        std::fs::write(plugins.path().join("only_here.wasm"), b"").unwrap();

        let resolver = ImportResolver::new(vec![libs.path().to_path_buf(), plugins.path().to_path_buf()]);
        assert_eq!(resolver.resolve("shared"), Some(libs.path().join("shared.wasm")));
        assert_eq!(
            resolver.resolve("only_here"),
            Some(plugins.path().join("only_here.wasm"))
        );
        assert_eq!(resolver.resolve("env"), None);
    }

    #[test]
    fn test_path_like_names_never_resolve() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("x.wasm"), b"").unwrap();

        let resolver = ImportResolver::new(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve("nested/x"), None);
        assert_eq!(resolver.resolve(".."), None);
        assert_eq!(resolver.resolve(""), None);
    }
}
