//! Synchronizer configuration.

use super::{validate_branch_name, ConfigError, ReleaseSettings};

/// Configuration for one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Branch releases are cut from.
    base_branch: String,
    /// Long-lived branch backing the release pull request.
    release_branch: String,
    /// JSON project manifest carrying the version (`package.json`, `deno.json`).
    project_manifest: String,
    /// Path-keyed versions manifest.
    versions_manifest: String,
    /// Title, body and notification settings.
    settings: ReleaseSettings,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_branch: "main".to_string(),
            release_branch: "pls-release".to_string(),
            project_manifest: "package.json".to_string(),
            versions_manifest: ".pls/versions.json".to_string(),
            settings: ReleaseSettings::default(),
        }
    }
}

impl SyncConfig {
    /// Creates a configuration for the given branches with default paths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBranchName`] if either branch name is not
    /// a valid git reference name.
    pub fn new(base_branch: &str, release_branch: &str) -> Result<Self, ConfigError> {
        validate_branch_name(base_branch)?;
        validate_branch_name(release_branch)?;
        Ok(Self {
            base_branch: base_branch.to_string(),
            release_branch: release_branch.to_string(),
            ..Self::default()
        })
    }

    /// Sets the project manifest path.
    pub fn with_project_manifest(mut self, path: impl Into<String>) -> Self {
        self.project_manifest = path.into();
        self
    }

    /// Sets the versions manifest path.
    pub fn with_versions_manifest(mut self, path: impl Into<String>) -> Self {
        self.versions_manifest = path.into();
        self
    }

    /// Sets the release settings.
    pub fn with_settings(mut self, settings: ReleaseSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    pub fn release_branch(&self) -> &str {
        &self.release_branch
    }

    pub fn project_manifest(&self) -> &str {
        &self.project_manifest
    }

    pub fn versions_manifest(&self) -> &str {
        &self.versions_manifest
    }

    pub fn settings(&self) -> &ReleaseSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::default();

        assert_eq!(config.base_branch(), "main");
        assert_eq!(config.release_branch(), "pls-release");
        assert_eq!(config.project_manifest(), "package.json");
        assert_eq!(config.versions_manifest(), ".pls/versions.json");
        assert!(config.settings().notify);
    }

    #[test]
    fn builder_overrides_paths() {
        let config = SyncConfig::new("develop", "release/next")
            .unwrap()
            .with_project_manifest("deno.json")
            .with_versions_manifest("versions.json");

        assert_eq!(config.base_branch(), "develop");
        assert_eq!(config.release_branch(), "release/next");
        assert_eq!(config.project_manifest(), "deno.json");
        assert_eq!(config.versions_manifest(), "versions.json");
    }

    #[test]
    fn rejects_invalid_branch_names() {
        assert!(matches!(
            SyncConfig::new("main", "bad..name"),
            Err(ConfigError::InvalidBranchName { .. })
        ));
    }
}
