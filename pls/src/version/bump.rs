//! Bump classes and the per-run version bump record.

use crate::store::Commit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of version change carried by a release.
///
/// `Transition` marks a prerelease-stage move rather than a
/// conventional-commit-driven bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    Major,
    Minor,
    Patch,
    Transition,
}

impl BumpType {
    /// Returns the wire name used in markers and commit metadata.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Transition => "transition",
        }
    }

    /// Parses a wire name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "major" => Some(Self::Major),
            "minor" => Some(Self::Minor),
            "patch" => Some(Self::Patch),
            "transition" => Some(Self::Transition),
            _ => None,
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The version change computed for one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBump {
    /// Version the release starts from.
    pub from: String,

    /// Version the release produces.
    pub to: String,

    /// Kind of change.
    pub bump_type: BumpType,

    /// Commits that contributed to the bump, oldest first.
    pub commits: Vec<Commit>,
}
