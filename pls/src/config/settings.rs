//! `pls.toml` release settings.

use super::ConfigError;
use crate::templates::DEFAULT_BODY_TEMPLATE;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Release pull request settings read from `pls.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseSettings {
    /// Handlebars format of the pull request title.
    #[serde(default = "default_pr_title_format")]
    pub pr_title_format: String,

    /// Handlebars template of the pull request body.
    #[serde(default = "default_pr_body_template")]
    pub pr_body_template: String,

    /// Whether to comment on the pull request when the version changes.
    #[serde(default = "default_notify")]
    pub notify: bool,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            pr_title_format: default_pr_title_format(),
            pr_body_template: default_pr_body_template(),
            notify: default_notify(),
        }
    }
}

impl ReleaseSettings {
    /// Parses settings from TOML content read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] for malformed TOML.
    pub fn parse(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlError {
            path: path.to_string(),
            source,
        })
    }
}

/// Loads settings from `path`, falling back to defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings(path: &Path) -> Result<ReleaseSettings, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(ReleaseSettings::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    ReleaseSettings::parse(&content, &path.display().to_string())
}

/// Returns the default pull request title format.
pub fn default_pr_title_format() -> String {
    "chore: release v{{version}}".to_string()
}

/// Returns the built-in pull request body template.
pub fn default_pr_body_template() -> String {
    DEFAULT_BODY_TEMPLATE.to_string()
}

fn default_notify() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_kebab_case_keys() {
        let settings = ReleaseSettings::parse(
            r#"
pr-title-format = "release: {{version}}"
notify = false
"#,
            "pls.toml",
        )
        .unwrap();

        assert_eq!(settings.pr_title_format, "release: {{version}}");
        assert_eq!(settings.pr_body_template, DEFAULT_BODY_TEMPLATE);
        assert!(!settings.notify);
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(
            ReleaseSettings::parse("", "pls.toml").unwrap(),
            ReleaseSettings::default()
        );
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();

        let settings = load_settings(&temp.path().join("pls.toml")).unwrap();
        assert_eq!(settings, ReleaseSettings::default());
    }

    #[test]
    fn load_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pls.toml");
        fs::write(&path, "pr-body-template = \"{{options}}\"\n").unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.pr_body_template, "{{options}}");
        assert_eq!(settings.pr_title_format, default_pr_title_format());
    }

    #[test]
    fn load_reports_malformed_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pls.toml");
        fs::write(&path, "notify = maybe").unwrap();

        let result = load_settings(&path);
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }
}
