//! Terminal states of a synchronization run.

use serde::Serialize;
use std::fmt;

/// Result of a successful run. Failures are reported as
/// [`SyncError`](super::SyncError).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Nothing to release.
    NoOp {
        /// Why the run stopped.
        reason: String,
    },

    /// A release branch and pull request were created.
    Created {
        number: u64,
        url: String,
        version: String,
    },

    /// The existing release pull request was refreshed.
    Updated {
        number: u64,
        url: String,
        version: String,
        /// Whether the released version differs from the previous run.
        selection_changed: bool,
    },
}

impl SyncOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoOp { .. } => "no-op",
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
        }
    }

    /// Returns the released version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::NoOp { .. } => None,
            Self::Created { version, .. } | Self::Updated { version, .. } => Some(version),
        }
    }

    /// Returns the pull request URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::NoOp { .. } => None,
            Self::Created { url, .. } | Self::Updated { url, .. } => Some(url),
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp { reason } => write!(f, "no-op: {reason}"),
            Self::Created { number, url, version } => {
                write!(f, "created #{number} for v{version} ({url})")
            }
            Self::Updated {
                number,
                url,
                version,
                selection_changed,
            } => {
                write!(f, "updated #{number} for v{version} ({url})")?;
                if *selection_changed {
                    f.write_str(", version changed")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let outcome = SyncOutcome::Created {
            number: 7,
            url: "https://example.test/pull/7".to_string(),
            version: "1.1.0".to_string(),
        };

        assert_eq!(outcome.as_str(), "created");
        assert_eq!(outcome.version(), Some("1.1.0"));
        assert_eq!(outcome.to_string(), "created #7 for v1.1.0 (https://example.test/pull/7)");
    }

    #[test]
    fn serializes_with_status_tag() {
        let outcome = SyncOutcome::NoOp {
            reason: "no commits since last release".to_string(),
        };

        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"status":"no_op","reason":"no commits since last release"}"#
        );
        assert_eq!(outcome.version(), None);
    }
}
