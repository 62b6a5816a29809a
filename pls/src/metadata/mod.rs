//! Release commit message codec.
//!
//! A release commit carries a structured block after its title:
//!
//! ```text
//! chore: release v1.1.0
//!
//! ---pls-release---
//! version: 1.1.0
//! from: 1.0.0
//! type: minor
//! ---pls-release---
//! ```
//!
//! [`extract_version`] also recognizes bare `chore: release v<semver>`
//! titles written before the block existed.

use crate::version::BumpType;
use regex::Regex;
use std::sync::LazyLock;

/// Delimiter line surrounding the metadata block.
pub const METADATA_DELIMITER: &str = "---pls-release---";

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^chore(?:\([^)]*\))?:\s*release\s+v?(?P<version>\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)\b")
        .unwrap()
});

/// Structured description of a release commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    pub version: String,
    pub from: String,
    pub bump_type: BumpType,
}

impl ReleaseMetadata {
    pub fn new(version: impl Into<String>, from: impl Into<String>, bump_type: BumpType) -> Self {
        Self {
            version: version.into(),
            from: from.into(),
            bump_type,
        }
    }
}

/// Encodes `metadata` as a full commit message.
#[must_use]
pub fn encode(metadata: &ReleaseMetadata) -> String {
    format!(
        "chore: release v{version}\n\n{METADATA_DELIMITER}\nversion: {version}\nfrom: {from}\ntype: {bump_type}\n{METADATA_DELIMITER}\n",
        version = metadata.version,
        from = metadata.from,
        bump_type = metadata.bump_type,
    )
}

/// Decodes the metadata block of a commit message.
///
/// Returns `None` unless the block is delimited on both sides, carries
/// `version`, `from` and `type`, and `type` names a known bump class.
#[must_use]
pub fn decode(message: &str) -> Option<ReleaseMetadata> {
    let mut lines = message.lines().map(str::trim);
    lines.by_ref().find(|line| *line == METADATA_DELIMITER)?;

    let mut version = None;
    let mut from = None;
    let mut bump_type = None;
    let mut closed = false;

    for line in lines {
        if line == METADATA_DELIMITER {
            closed = true;
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "version" if !value.is_empty() => version = Some(value.to_string()),
            "from" if !value.is_empty() => from = Some(value.to_string()),
            "type" => bump_type = BumpType::parse(value),
            _ => {}
        }
    }

    if !closed {
        return None;
    }
    Some(ReleaseMetadata {
        version: version?,
        from: from?,
        bump_type: bump_type?,
    })
}

/// Returns the version a commit message releases, if it is a release
/// commit.
///
/// Tries the structured block first, then the title line.
#[must_use]
pub fn extract_version(message: &str) -> Option<String> {
    let decoders: [fn(&str) -> Option<String>; 2] = [
        |message| decode(message).map(|metadata| metadata.version),
        version_from_title,
    ];
    decoders.iter().find_map(|decoder| decoder(message))
}

fn version_from_title(message: &str) -> Option<String> {
    let title = message.lines().next()?.trim();
    TITLE_RE
        .captures(title)
        .map(|captures| captures["version"].to_string())
}
