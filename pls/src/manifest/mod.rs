//! Version-bearing manifests.
//!
//! The versions manifest (`.pls/versions.json` by default) maps package
//! paths to their released version, `"."` being the repository root. Two
//! value shapes exist: a bare version string (legacy) and an object
//! `{ "version", "sha"?, "versionFile"? }`. [`VersionsManifest`] accepts
//! both and always hands out the normalized [`VersionsManifestEntry`].

mod error;
mod project;

pub use error::ManifestError;
pub use project::{project_version, set_project_version};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package key of the repository root.
pub const ROOT_PACKAGE: &str = ".";

/// Normalized versions manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionsManifestEntry {
    pub version: String,

    /// Commit of the last release, used to anchor the change range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,

    /// File that carries the version, when it is not the project manifest.
    #[serde(rename = "versionFile", default, skip_serializing_if = "Option::is_none")]
    pub version_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum ManifestValue {
    Legacy(String),
    Entry(VersionsManifestEntry),
}

impl ManifestValue {
    fn to_entry(&self) -> VersionsManifestEntry {
        match self {
            Self::Legacy(version) => VersionsManifestEntry {
                version: version.clone(),
                ..VersionsManifestEntry::default()
            },
            Self::Entry(entry) => entry.clone(),
        }
    }
}

/// Parsed versions manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionsManifest {
    packages: BTreeMap<String, ManifestValue>,
}

impl VersionsManifest {
    /// Parses manifest content read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Decode`] if the content is not a JSON object
    /// of version strings or entry objects.
    pub fn parse(content: &str, path: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(content).map_err(|source| ManifestError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// Returns the normalized entry for `package`.
    #[must_use]
    pub fn entry(&self, package: &str) -> Option<VersionsManifestEntry> {
        self.packages.get(package).map(ManifestValue::to_entry)
    }

    /// Iterates all packages with their normalized entries.
    pub fn entries(&self) -> impl Iterator<Item = (&str, VersionsManifestEntry)> {
        self.packages
            .iter()
            .map(|(package, value)| (package.as_str(), value.to_entry()))
    }

    /// Sets the version of `package`, keeping its `sha` and `versionFile`.
    ///
    /// Legacy string values are rewritten in the object form.
    pub fn set_version(&mut self, package: &str, version: &str) {
        let mut entry = self.entry(package).unwrap_or_default();
        entry.version = version.to_string();
        self.packages
            .insert(package.to_string(), ManifestValue::Entry(entry));
    }

    /// Serializes the manifest as pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Encode`] if serialization fails.
    pub fn to_json(&self, path: &str) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self)
            .map(|json| json + "\n")
            .map_err(|source| ManifestError::Encode {
                path: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = ".pls/versions.json";

    #[test]
    fn reads_both_value_shapes() {
        let manifest = VersionsManifest::parse(
            r#"{ ".": { "version": "1.2.0", "sha": "abc123" }, "packages/cli": "0.3.1" }"#,
            PATH,
        )
        .unwrap();

        let root = manifest.entry(ROOT_PACKAGE).unwrap();
        assert_eq!(root.version, "1.2.0");
        assert_eq!(root.sha.as_deref(), Some("abc123"));

        let cli = manifest.entry("packages/cli").unwrap();
        assert_eq!(cli.version, "0.3.1");
        assert_eq!(cli.sha, None);
        assert_eq!(manifest.entries().count(), 2);
    }

    #[test]
    fn set_version_preserves_anchor_fields() {
        let mut manifest = VersionsManifest::parse(
            r#"{ ".": { "version": "1.2.0", "sha": "abc123", "versionFile": "deno.json" } }"#,
            PATH,
        )
        .unwrap();
        manifest.set_version(ROOT_PACKAGE, "1.3.0");

        let root = manifest.entry(ROOT_PACKAGE).unwrap();
        assert_eq!(root.version, "1.3.0");
        assert_eq!(root.sha.as_deref(), Some("abc123"));
        assert_eq!(root.version_file.as_deref(), Some("deno.json"));
        assert!(manifest.to_json(PATH).unwrap().contains("\"versionFile\": \"deno.json\""));
    }

    #[test]
    fn upgrades_legacy_values_on_write() {
        let mut manifest = VersionsManifest::parse(r#"{ ".": "1.0.0" }"#, PATH).unwrap();
        manifest.set_version(ROOT_PACKAGE, "1.1.0");

        assert_eq!(
            manifest.to_json(PATH).unwrap(),
            "{\n  \".\": {\n    \"version\": \"1.1.0\"\n  }\n}\n"
        );
    }

    #[test]
    fn set_version_creates_missing_package() {
        let mut manifest = VersionsManifest::default();
        manifest.set_version(ROOT_PACKAGE, "0.1.0");

        assert_eq!(manifest.entry(ROOT_PACKAGE).unwrap().version, "0.1.0");
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let error = VersionsManifest::parse("{ not json", PATH).unwrap_err();

        assert!(matches!(error, ManifestError::Decode { .. }));
        assert!(error.to_string().contains(PATH));
    }
}
