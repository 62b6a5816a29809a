//! Prerelease lifecycle stages.

use semver::Version;
use std::fmt;
use std::str::FromStr;

/// A point in the prerelease lifecycle.
///
/// The derived ordering is the lifecycle order `alpha < beta < rc < stable`,
/// which is what forward-only transitions are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Alpha,
    Beta,
    Rc,
    Stable,
}

impl Stage {
    /// The stages that render as a prerelease suffix.
    pub const PRERELEASE: [Stage; 3] = [Stage::Alpha, Stage::Beta, Stage::Rc];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
            Self::Stable => "stable",
        }
    }

    /// Parses a stage name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "alpha" => Some(Self::Alpha),
            "beta" => Some(Self::Beta),
            "rc" => Some(Self::Rc),
            "stable" => Some(Self::Stable),
            _ => None,
        }
    }

    /// Determines the stage of a parsed version.
    ///
    /// Returns `None` for prereleases whose first identifier is not a known
    /// stage (for example `1.0.0-dev.3`).
    #[must_use]
    pub fn of(version: &Version) -> Option<Self> {
        if version.pre.is_empty() {
            return Some(Self::Stable);
        }
        version
            .pre
            .as_str()
            .split('.')
            .next()
            .and_then(Self::parse)
            .filter(|stage| *stage != Self::Stable)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown stage '{s}' (expected alpha, beta, rc or stable)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_stages_by_lifecycle() {
        assert!(Stage::Alpha < Stage::Beta);
        assert!(Stage::Beta < Stage::Rc);
        assert!(Stage::Rc < Stage::Stable);
    }

    #[test]
    fn detects_stage_of_version() {
        let stable = Version::parse("1.2.3").unwrap();
        let beta = Version::parse("1.2.3-beta.4").unwrap();
        let custom = Version::parse("1.2.3-dev.1").unwrap();

        assert_eq!(Stage::of(&stable), Some(Stage::Stable));
        assert_eq!(Stage::of(&beta), Some(Stage::Beta));
        assert_eq!(Stage::of(&custom), None);
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("RC".parse::<Stage>(), Ok(Stage::Rc));
        assert!("gamma".parse::<Stage>().is_err());
    }
}
