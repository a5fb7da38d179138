//! Plugin manifest model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Declared identity of a plugin, read from its embedded manifest resource.
///
/// Only `id` and `name` influence loading. The remaining fields are parsed
/// so tooling can show them; dependency and ordering declarations are not
/// acted upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Explicit plugin id. Always set after [`Manifest::from_resource`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name; doubles as the id when none is declared.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub depends_on: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conflicts_with: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_before: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_after: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misc: Option<serde_json::Value>,
}

impl Manifest {
    /// Parses a manifest resource and resolves its id.
    ///
    /// A leading UTF-8 byte order mark is skipped.
    pub fn from_resource(resource: &str, bytes: &[u8]) -> Result<Self, IngestError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let mut manifest: Self =
            serde_json::from_slice(bytes).map_err(|e| IngestError::ManifestParse {
                resource: resource.to_string(),
                reason: e.to_string(),
            })?;

        manifest.resolve_id();
        if manifest.effective_id().is_empty() {
            return Err(IngestError::ManifestParse {
                resource: resource.to_string(),
                reason: "neither 'id' nor 'name' is set".to_string(),
            });
        }
        Ok(manifest)
    }

    /// Substitutes the name for a missing or empty id.
    pub fn resolve_id(&mut self) {
        if self.id.as_deref().is_none_or(str::is_empty) {
            self.id = Some(self.name.clone());
        }
    }

    /// `id` when present and non-empty, otherwise `name`.
    pub fn effective_id(&self) -> &str {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_becomes_id() {
        let manifest = Manifest::from_resource("Foo.manifest.json", br#"{"name":"Foo Mod"}"#).unwrap();
        assert_eq!(manifest.effective_id(), "Foo Mod");
        assert_eq!(manifest.id.as_deref(), Some("Foo Mod"));
    }

    #[test]
    fn test_explicit_id_wins() {
        let manifest =
            Manifest::from_resource("Bar.manifest.json", br#"{"id":"bar","name":"Bar"}"#).unwrap();
        assert_eq!(manifest.effective_id(), "bar");
        assert_eq!(manifest.name, "Bar");
    }

    #[test]
    fn test_empty_id_counts_as_absent() {
        let manifest =
            Manifest::from_resource("Baz.manifest.json", br#"{"id":"","name":"Baz"}"#).unwrap();
        assert_eq!(manifest.effective_id(), "Baz");
    }

    #[test]
    fn test_unknown_fields_and_bom_are_tolerated() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(
            br#"{
                "name": "Qux",
                "version": "1.2.0",
                "gameVersion": "1.29.1",
                "dependsOn": {"Core": "^1.0.0"},
                "loadAfter": ["Core"],
                "description": ["multi", "line"],
                "somethingElse": 42
            }"#,
        );
        let manifest = Manifest::from_resource("Qux.manifest.json", &bytes).unwrap();
        assert_eq!(manifest.effective_id(), "Qux");
        assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
        assert_eq!(manifest.depends_on.get("Core").map(String::as_str), Some("^1.0.0"));
        assert_eq!(manifest.load_after, vec!["Core".to_string()]);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Manifest::from_resource("Foo.manifest.json", b"{ name: ").unwrap_err();
        assert!(matches!(err, IngestError::ManifestParse { ref resource, .. } if resource == "Foo.manifest.json"));
    }

    #[test]
    fn test_missing_name_is_parse_error() {
        let err = Manifest::from_resource("Foo.manifest.json", br#"{"id":"foo"}"#).unwrap_err();
        assert!(matches!(err, IngestError::ManifestParse { .. }));
    }

    #[test]
    fn test_unresolvable_id_is_parse_error() {
        let err = Manifest::from_resource("Foo.manifest.json", br#"{"name":""}"#).unwrap_err();
        assert!(matches!(err, IngestError::ManifestParse { .. }));
    }
}
