//! Manifest and entry type discovery over parsed metadata.
//!
//! Pure functions; nothing here touches the module bytes again.

use hotload_core::types::RuntimeOptions;

use super::format::{MANIFEST_SUFFIX, PLUGIN_ATTRIBUTE};
use super::{EmbeddedResource, TypeDefinition};
use crate::error::IngestError;
use crate::record::EntryTypeDescriptor;

/// The manifest resource and the namespace derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestResource<'a> {
    pub name: &'a str,
    pub namespace: &'a str,
    pub data: &'a [u8],
}

/// First resource whose name ends with the manifest suffix.
pub fn find_manifest(resources: &[EmbeddedResource]) -> Result<ManifestResource<'_>, IngestError> {
    resources
        .iter()
        .find_map(|resource| {
            resource
                .name
                .strip_suffix(MANIFEST_SUFFIX)
                .map(|namespace| ManifestResource {
                    name: &resource.name,
                    namespace,
                    data: &resource.data,
                })
        })
        .ok_or(IngestError::ManifestNotFound {
            suffix: MANIFEST_SUFFIX,
        })
}

/// Raw runtime options value of a type's plugin entry marker.
///
/// Only the first marker attribute is considered. It must have exactly one
/// argument typed as the runtime options enum. The value is not checked here.
pub fn entry_marker(ty: &TypeDefinition) -> Option<i32> {
    let attribute = ty
        .attributes
        .iter()
        .find(|attribute| attribute.attribute_type == PLUGIN_ATTRIBUTE)?;

    let [argument] = attribute.arguments.as_slice() else {
        return None;
    };
    if argument.arg_type != RuntimeOptions::TYPE_NAME {
        return None;
    }
    Some(argument.value)
}

/// First type in `namespace`, in table order, with a well-formed entry marker.
///
/// A marker value outside the known runtime options fails the module instead
/// of falling through to a later type.
pub fn find_entry_type(
    types: &[TypeDefinition],
    namespace: &str,
) -> Result<EntryTypeDescriptor, IngestError> {
    let (ty, value) = types
        .iter()
        .filter(|ty| ty.namespace() == namespace)
        .find_map(|ty| entry_marker(ty).map(|value| (ty, value)))
        .ok_or_else(|| IngestError::EntryTypeNotFound {
            namespace: namespace.to_string(),
        })?;

    let runtime_options = RuntimeOptions::try_from(value).map_err(|value| {
        IngestError::MalformedModule(format!(
            "entry type '{}' declares unknown runtime options value {value}",
            ty.full_name
        ))
    })?;

    Ok(EntryTypeDescriptor {
        full_name: ty.full_name.clone(),
        runtime_options,
    })
}
