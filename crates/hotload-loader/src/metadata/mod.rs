//! Metadata-only inspection of plugin modules.
//!
//! Everything in here works on raw module bytes through `wasmparser`. No
//! module is compiled or instantiated, so inspecting a hostile module cannot
//! run its code.

pub mod discovery;
pub mod format;
pub mod reader;
pub mod resolver;
pub mod source;

use std::path::PathBuf;

pub use reader::{MetadataReader, RawPluginMetadata};
pub use resolver::ImportResolver;
pub use source::ModuleSource;

/// Read-only view of a module's embedded resources, types and imports.
#[derive(Debug, Clone, Default)]
pub struct ModuleMetadata {
    /// Custom sections other than the type table, in file order.
    pub resources: Vec<EmbeddedResource>,
    /// Type table entries in natural enumeration order.
    pub types: Vec<TypeDefinition>,
    /// Imports with their resolution against the search directories.
    pub imports: Vec<ImportReference>,
    /// Names of exported functions.
    pub exports: Vec<String>,
}

/// A named resource embedded in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedResource {
    pub name: String,
    pub data: Vec<u8>,
}

/// A type declared in the module's type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    /// Namespace-qualified name, e.g. `Foo.Plugin`.
    pub full_name: String,
    pub attributes: Vec<CustomAttribute>,
}

impl TypeDefinition {
    pub fn new(full_name: impl Into<String>, attributes: Vec<CustomAttribute>) -> Self {
        Self {
            full_name: full_name.into(),
            attributes,
        }
    }

    /// Everything before the last `.`; empty for unqualified names.
    pub fn namespace(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map(|(namespace, _)| namespace)
            .unwrap_or("")
    }
}

/// An attribute attached to a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttribute {
    /// Fully qualified attribute type name.
    pub attribute_type: String,
    /// Constructor arguments.
    pub arguments: Vec<AttributeArgument>,
}

/// A constructor argument of an attribute. Only enum-like integer values
/// are representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeArgument {
    pub arg_type: String,
    pub value: i32,
}

/// An import and where it resolved to, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    pub module: String,
    pub name: String,
    pub resolved: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_is_prefix_before_last_dot() {
        assert_eq!(TypeDefinition::new("Foo.Plugin", vec![]).namespace(), "Foo");
        assert_eq!(TypeDefinition::new("Foo.Bar.Plugin", vec![]).namespace(), "Foo.Bar");
        assert_eq!(TypeDefinition::new("Plugin", vec![]).namespace(), "");
    }
}
