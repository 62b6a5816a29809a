//! Configuration for the release synchronizer.
//!
//! [`SyncConfig`] is passed explicitly into the synchronizer. Values that may
//! come from the environment are resolved once at the process boundary with
//! [`resolve_setting`].

mod error;
mod settings;
mod sync;

pub use error::ConfigError;
pub use settings::{default_pr_body_template, default_pr_title_format, load_settings, ReleaseSettings};
pub use sync::SyncConfig;

use bstr::BStr;

/// Validates `name` as a partial git reference name (e.g. `main`,
/// `release/next`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBranchName`] describing the violated rule.
pub fn validate_branch_name(name: &str) -> Result<(), ConfigError> {
    gix_validate::reference::name_partial(BStr::new(name))
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidBranchName {
            name: name.to_string(),
            message: e.to_string(),
        })
}

/// Splits an `owner/name` repository slug.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRepository`] unless both parts are present.
pub fn parse_repository(value: &str) -> Result<(String, String), ConfigError> {
    match value.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(ConfigError::InvalidRepository {
            value: value.to_string(),
        }),
    }
}

/// Resolves a setting: an explicit non-empty value wins, then the
/// environment variable `env_var`, then `default`.
#[must_use]
pub fn resolve_setting(explicit: Option<&str>, env_var: &str, default: Option<&str>) -> Option<String> {
    explicit
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok().filter(|value| !value.trim().is_empty()))
        .or_else(|| default.map(str::to_string))
}

/// Like [`resolve_setting`] without a default, failing when nothing is set.
///
/// # Errors
///
/// Returns [`ConfigError::MissingSetting`] naming the setting and variable.
pub fn require_setting(explicit: Option<&str>, env_var: &str, name: &str) -> Result<String, ConfigError> {
    resolve_setting(explicit, env_var, None).ok_or_else(|| ConfigError::MissingSetting {
        name: name.to_string(),
        env_var: env_var.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_branch_names() {
        for name in ["main", "pls-release", "release/next", "feature/v1.2"] {
            assert!(validate_branch_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_malformed_branch_names() {
        for name in ["", "has space", "a..b", "ends.lock", "trailing/"] {
            assert!(
                matches!(validate_branch_name(name), Err(ConfigError::InvalidBranchName { .. })),
                "{name}"
            );
        }
    }

    #[test]
    fn parses_repository_slugs() {
        assert_eq!(
            parse_repository("octo/widgets").unwrap(),
            ("octo".to_string(), "widgets".to_string())
        );
        for value in ["widgets", "/widgets", "octo/", "a/b/c"] {
            assert!(
                matches!(parse_repository(value), Err(ConfigError::InvalidRepository { .. })),
                "{value}"
            );
        }
    }

    #[test]
    fn explicit_value_wins() {
        temp_env::with_var("PLS_TEST_BASE", Some("from-env"), || {
            assert_eq!(
                resolve_setting(Some("explicit"), "PLS_TEST_BASE", Some("default")),
                Some("explicit".to_string())
            );
        });
    }

    #[test]
    fn environment_beats_default() {
        temp_env::with_var("PLS_TEST_BASE", Some("from-env"), || {
            assert_eq!(
                resolve_setting(None, "PLS_TEST_BASE", Some("default")),
                Some("from-env".to_string())
            );
            assert_eq!(
                resolve_setting(Some("  "), "PLS_TEST_BASE", Some("default")),
                Some("from-env".to_string())
            );
        });
    }

    #[test]
    fn falls_back_to_default() {
        temp_env::with_var_unset("PLS_TEST_BASE", || {
            assert_eq!(
                resolve_setting(None, "PLS_TEST_BASE", Some("main")),
                Some("main".to_string())
            );
            assert_eq!(resolve_setting(None, "PLS_TEST_BASE", None), None);
        });
    }

    #[test]
    fn require_reports_missing_setting() {
        temp_env::with_var_unset("PLS_TEST_TOKEN", || {
            let error = require_setting(None, "PLS_TEST_TOKEN", "token").unwrap_err();
            assert!(matches!(error, ConfigError::MissingSetting { .. }));
            assert!(error.to_string().contains("$PLS_TEST_TOKEN"));
        });
    }
}
