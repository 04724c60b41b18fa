//! Tool definitions catalog and version resolution.
//!
//! ## Catalog Format
//!
//! ```json
//! {
//!   "tools": {
//!     "sc-client": {
//!       "defaultVersion": "23.1.0",
//!       "versions": [
//!         {
//!           "version": "23.1.0",
//!           "aliases": ["23.1", "23"],
//!           "downloadUrl": "https://tools.fortify.com/scancentral/Fortify_ScanCentral_Client_23.1.0_x64.zip",
//!           "digestAlgorithm": "SHA-256",
//!           "expectedDigest": "..."
//!         }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Resolution is a pure function of the loaded catalog.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::{DigestAlgorithm, DownloadDescriptor};
use crate::errors::ToolError;

/// Version token that selects the catalog's designated default version.
pub const DEFAULT_VERSION: &str = "default";

/// One published version of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub download_url: String,
    pub digest_algorithm: String,
    pub expected_digest: String,
}

impl VersionEntry {
    fn matches(&self, token: &str) -> bool {
        self.version == token || self.aliases.iter().any(|a| a == token)
    }
}

/// All published versions of one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEntry {
    pub default_version: String,
    pub versions: Vec<VersionEntry>,
}

impl ToolEntry {
    /// Finds the entry matching `token`, mapping `default` first.
    #[must_use = "returns the entry without side effects"]
    pub fn find(&self, token: &str) -> Option<&VersionEntry> {
        let token = if token == DEFAULT_VERSION {
            self.default_version.as_str()
        } else {
            token
        };
        self.versions
            .iter()
            .find(|v| v.version == token)
            .or_else(|| self.versions.iter().find(|v| v.matches(token)))
    }

    /// Versions sorted by semver, newest first.
    ///
    /// Versions that are not valid semver sort after valid ones, in
    /// descending string order.
    #[must_use = "returns sorted version list without side effects"]
    pub fn sorted_versions(&self) -> Vec<&VersionEntry> {
        let mut versions: Vec<&VersionEntry> = self.versions.iter().collect();
        versions.sort_by(|a, b| {
            let a_ver = semver::Version::parse(&a.version).ok();
            let b_ver = semver::Version::parse(&b.version).ok();
            match (a_ver, b_ver) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => b.version.cmp(&a.version),
            }
        });
        versions
    }
}

/// The complete tool definitions document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCatalog {
    pub tools: BTreeMap<String, ToolEntry>,
}

impl ToolCatalog {
    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a `Catalog` error if the text is not a valid catalog.
    pub fn from_json(text: &str) -> Result<Self, ToolError> {
        serde_json::from_str(text)
            .map_err(|e| ToolError::catalog(format!("invalid tool definitions: {e}")))
    }

    /// Loads the catalog from a tool definitions file.
    ///
    /// # Errors
    ///
    /// Returns a `Catalog` error if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self, ToolError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ToolError::catalog(format!(
                "cannot read tool definitions from {}: {e}; run 'fcli tool definitions update' first",
                path.display()
            ))
        })?;
        Self::from_json(&text)
    }

    /// Returns the entry for a tool.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` if the catalog has no such tool.
    pub fn tool(&self, tool: &str) -> Result<&ToolEntry, ToolError> {
        self.tools
            .get(tool)
            .ok_or_else(|| ToolError::unknown_tool(tool))
    }

    /// Resolves a version token to a download descriptor.
    ///
    /// `default` maps to the tool's designated default version; other tokens
    /// match a version exactly, then any alias.
    ///
    /// # Errors
    ///
    /// - `UnknownTool` if the tool has no catalog entry
    /// - `UnknownVersion` if no published version matches the token
    /// - `Catalog` if the matched entry has no digest or an unsupported
    ///   digest algorithm
    pub fn resolve(&self, tool: &str, token: &str) -> Result<DownloadDescriptor, ToolError> {
        let entry = self.tool(tool)?;
        let version = entry.find(token).ok_or_else(|| {
            ToolError::unknown_version(
                tool,
                token,
                entry
                    .sorted_versions()
                    .iter()
                    .map(|v| v.version.clone())
                    .collect(),
            )
        })?;

        if version.version == DEFAULT_VERSION {
            return Err(ToolError::catalog(format!(
                "{tool} publishes a version literally named '{DEFAULT_VERSION}'"
            )));
        }
        if version.expected_digest.trim().is_empty() {
            return Err(ToolError::catalog(format!(
                "{tool} {} has no expected digest",
                version.version
            )));
        }
        let digest_algorithm: DigestAlgorithm = version.digest_algorithm.parse()?;

        Ok(DownloadDescriptor {
            tool_name: tool.to_string(),
            version: version.version.clone(),
            download_url: version.download_url.clone(),
            digest_algorithm,
            expected_digest: version.expected_digest.trim().to_ascii_lowercase(),
        })
    }

    /// Checks every entry so a broken catalog is rejected before it is saved.
    ///
    /// # Errors
    ///
    /// Returns a `Catalog` error describing the first invalid entry.
    pub fn validate(&self) -> Result<(), ToolError> {
        for (name, entry) in &self.tools {
            if entry.find(&entry.default_version).is_none() {
                return Err(ToolError::catalog(format!(
                    "{name}: default version {} is not published",
                    entry.default_version
                )));
            }
            for version in &entry.versions {
                self.resolve(name, &version.version)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog_json() -> &'static str {
        r#"{
            "tools": {
                "scanctl": {
                    "defaultVersion": "1.2.0",
                    "versions": [
                        {
                            "version": "1.1.0",
                            "downloadUrl": "https://tools.example.com/scanctl-1.1.0.zip",
                            "digestAlgorithm": "SHA-256",
                            "expectedDigest": "1111"
                        },
                        {
                            "version": "1.2.0",
                            "aliases": ["1.2", "1"],
                            "downloadUrl": "https://tools.example.com/scanctl-1.2.0.zip",
                            "digestAlgorithm": "SHA-256",
                            "expectedDigest": "ABCDEF"
                        },
                        {
                            "version": "2.0.0-beta",
                            "downloadUrl": "https://tools.example.com/scanctl-2.0.0-beta.zip",
                            "digestAlgorithm": "sha512",
                            "expectedDigest": "2222"
                        }
                    ]
                },
                "broken": {
                    "defaultVersion": "0.1.0",
                    "versions": [
                        {
                            "version": "0.1.0",
                            "downloadUrl": "https://tools.example.com/broken.zip",
                            "digestAlgorithm": "SHA-256",
                            "expectedDigest": ""
                        }
                    ]
                }
            }
        }"#
    }

    fn catalog() -> ToolCatalog {
        ToolCatalog::from_json(sample_catalog_json()).expect("Should parse catalog")
    }

    #[test]
    fn resolve_default_maps_to_designated_version() {
        let descriptor = catalog().resolve("scanctl", DEFAULT_VERSION).unwrap();
        assert_eq!(descriptor.version, "1.2.0");
        assert_ne!(descriptor.version, DEFAULT_VERSION);
        assert_eq!(
            descriptor.download_url,
            "https://tools.example.com/scanctl-1.2.0.zip"
        );
    }

    #[test]
    fn resolve_exact_version() {
        let descriptor = catalog().resolve("scanctl", "1.1.0").unwrap();
        assert_eq!(descriptor.version, "1.1.0");
        assert_eq!(descriptor.expected_digest, "1111");
    }

    #[test]
    fn resolve_alias_returns_concrete_version() {
        let descriptor = catalog().resolve("scanctl", "1.2").unwrap();
        assert_eq!(descriptor.version, "1.2.0");
    }

    #[test]
    fn resolve_lowercases_expected_digest() {
        let descriptor = catalog().resolve("scanctl", "1.2.0").unwrap();
        assert_eq!(descriptor.expected_digest, "abcdef");
    }

    #[test]
    fn resolve_parses_digest_algorithm() {
        let descriptor = catalog().resolve("scanctl", "2.0.0-beta").unwrap();
        assert_eq!(descriptor.digest_algorithm, DigestAlgorithm::Sha512);
    }

    #[test]
    fn resolve_unknown_tool_fails() {
        let err = catalog().resolve("nope", DEFAULT_VERSION).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool { ref tool } if tool == "nope"));
    }

    #[test]
    fn resolve_unknown_version_lists_available() {
        let err = catalog().resolve("scanctl", "9.9.9").unwrap_err();
        match err {
            ToolError::UnknownVersion { available, .. } => {
                assert_eq!(available, vec!["2.0.0-beta", "1.2.0", "1.1.0"]);
            }
            other => panic!("Expected UnknownVersion, got {other:?}"),
        }
    }

    #[test]
    fn resolve_empty_digest_is_catalog_error() {
        let err = catalog().resolve("broken", DEFAULT_VERSION).unwrap_err();
        assert!(matches!(err, ToolError::Catalog { .. }));
    }

    #[test]
    fn every_published_version_resolves_to_a_concrete_version() {
        let catalog = catalog();
        let entry = catalog.tool("scanctl").unwrap();
        for version in &entry.versions {
            let descriptor = catalog.resolve("scanctl", &version.version).unwrap();
            assert_ne!(descriptor.version, DEFAULT_VERSION);
            for alias in &version.aliases {
                let via_alias = catalog.resolve("scanctl", alias).unwrap();
                assert_eq!(via_alias, descriptor);
            }
        }
    }

    #[test]
    fn sorted_versions_newest_first() {
        let catalog = catalog();
        let versions: Vec<&str> = catalog
            .tool("scanctl")
            .unwrap()
            .sorted_versions()
            .iter()
            .map(|v| v.version.as_str())
            .collect();
        assert_eq!(versions, vec!["2.0.0-beta", "1.2.0", "1.1.0"]);
    }

    #[test]
    fn validate_rejects_catalog_with_empty_digest() {
        assert!(matches!(
            catalog().validate(),
            Err(ToolError::Catalog { .. })
        ));
    }

    #[test]
    fn validate_rejects_unpublished_default() {
        let mut catalog = catalog();
        catalog.tools.remove("broken");
        catalog
            .tools
            .get_mut("scanctl")
            .unwrap()
            .default_version = "3.0.0".to_string();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_catalog() {
        let mut catalog = catalog();
        catalog.tools.remove("broken");
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ToolCatalog::load(Path::new("/nonexistent/tool-definitions.json")).unwrap_err();
        assert!(err.to_string().contains("tool definitions update"));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(ToolCatalog::from_json("not json").is_err());
    }
}
