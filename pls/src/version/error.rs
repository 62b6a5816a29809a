//! Version computation error types.

use thiserror::Error;

/// Errors that can occur while computing versions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    /// Input is not a semantic version.
    #[error("Invalid version format: '{version}'")]
    InvalidVersionFormat { version: String },

    /// Requested prerelease move violates the lifecycle rules.
    #[error("Invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },
}

impl VersionError {
    pub(crate) fn invalid_format(version: &str) -> Self {
        Self::InvalidVersionFormat {
            version: version.to_string(),
        }
    }

    pub(crate) fn invalid_transition(
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }
}
