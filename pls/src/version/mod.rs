//! Version bump computation.
//!
//! This module classifies commit batches by their conventional-commit
//! headers, computes the next semantic version, and implements the
//! prerelease lifecycle `stable -> alpha -> beta -> rc -> stable`.

mod bump;
mod conventional;
mod error;
mod stage;

pub use bump::{BumpType, VersionBump};
pub use conventional::{is_breaking, parse_header, ConventionalHeader, BREAKING_CHANGE_MARKER};
pub use error::VersionError;
pub use stage::Stage;

use crate::store::Commit;
use semver::{BuildMetadata, Prerelease, Version};

/// Classifies a batch of commits into a bump class.
///
/// A breaking change anywhere wins immediately. Otherwise any `feat` gives
/// `minor`, any `fix` gives `patch`, and any other non-empty batch falls back
/// to `patch`. Only an empty batch yields `None`.
#[must_use]
pub fn classify(commits: &[Commit]) -> Option<BumpType> {
    if commits.is_empty() {
        return None;
    }

    let mut has_feature = false;
    let mut has_fix = false;

    for commit in commits {
        if is_breaking(&commit.message) {
            return Some(BumpType::Major);
        }

        match parse_header(&commit.message).map(|h| h.kind) {
            Some(kind) if kind == "feat" => has_feature = true,
            Some(kind) if kind == "fix" => has_fix = true,
            _ => {}
        }
    }

    if has_feature {
        Some(BumpType::Minor)
    } else if has_fix {
        Some(BumpType::Patch)
    } else {
        // Unrecognized history still ships as a patch.
        Some(BumpType::Patch)
    }
}

/// Computes the next version for a bump class.
///
/// `major` resets minor and patch, `minor` resets patch. Any prerelease or
/// build suffix on `current` is dropped. `Transition` advances the trailing
/// prerelease counter instead.
///
/// # Errors
///
/// Returns [`VersionError::InvalidVersionFormat`] if `current` is not semver,
/// or [`VersionError::InvalidTransition`] for `Transition` on a stable version.
pub fn next_version(current: &str, bump: BumpType) -> Result<String, VersionError> {
    let mut version = parse_version(current)?;
    let overflow = || VersionError::invalid_format(current);

    match bump {
        BumpType::Major => {
            version.major = version.major.checked_add(1).ok_or_else(overflow)?;
            version.minor = 0;
            version.patch = 0;
        }
        BumpType::Minor => {
            version.minor = version.minor.checked_add(1).ok_or_else(overflow)?;
            version.patch = 0;
        }
        BumpType::Patch => version.patch = version.patch.checked_add(1).ok_or_else(overflow)?,
        BumpType::Transition => return increment_prerelease(current),
    }

    version.pre = Prerelease::EMPTY;
    version.build = BuildMetadata::EMPTY;
    Ok(version.to_string())
}

/// Moves a version to another lifecycle stage.
///
/// From stable, `bump` (default `minor`) computes the new version core before
/// the `-<stage>.0` suffix is attached. Between prerelease stages only
/// forward moves are allowed and the core is kept. Moving to stable strips
/// the suffix.
///
/// # Errors
///
/// Returns [`VersionError::InvalidTransition`] for stable-to-stable, backward
/// or same-stage moves, and for moving a prerelease with an unknown
/// identifier to anything but stable.
pub fn transition(
    current: &str,
    target: Stage,
    bump: Option<BumpType>,
) -> Result<String, VersionError> {
    let version = parse_version(current)?;
    let Some(from) = Stage::of(&version) else {
        if target == Stage::Stable {
            return Ok(core(&version).to_string());
        }
        return Err(VersionError::invalid_transition(
            current,
            target.as_str(),
            format!("unrecognized prerelease identifier '{}'", version.pre),
        ));
    };

    match (from, target) {
        (Stage::Stable, Stage::Stable) => Err(VersionError::invalid_transition(
            current,
            target.as_str(),
            "already on stable; use the normal bump flow",
        )),
        (Stage::Stable, stage) => {
            let class = match bump {
                Some(BumpType::Transition) | None => BumpType::Minor,
                Some(class) => class,
            };
            let base = parse_version(&next_version(current, class)?)?;
            with_stage(&base, stage)
        }
        (_, Stage::Stable) => Ok(core(&version).to_string()),
        (from, to) if to <= from => Err(VersionError::invalid_transition(
            current,
            to.as_str(),
            format!("prerelease stages only move forward (alpha -> beta -> rc); already at {from}"),
        )),
        (_, to) => with_stage(&core(&version), to),
    }
}

/// Computes the version bump for a run.
///
/// With an explicit `target` this is a [`transition`]. Otherwise a
/// prerelease only advances its counter (`alpha.3` -> `alpha.4`) and a stable
/// version defers to [`classify`] and [`next_version`]. Returns `None` when a
/// stable version has no commits to release.
///
/// # Errors
///
/// Propagates [`VersionError`] from the underlying computations.
pub fn compute_bump(
    current: &str,
    commits: &[Commit],
    target: Option<Stage>,
) -> Result<Option<VersionBump>, VersionError> {
    if let Some(stage) = target {
        let to = transition(current, stage, classify(commits))?;
        return Ok(Some(VersionBump {
            from: current.to_string(),
            to,
            bump_type: BumpType::Transition,
            commits: commits.to_vec(),
        }));
    }

    let version = parse_version(current)?;
    let (to, bump_type) = if version.pre.is_empty() {
        let Some(class) = classify(commits) else {
            return Ok(None);
        };
        (next_version(current, class)?, class)
    } else {
        (increment_prerelease(current)?, BumpType::Transition)
    };

    Ok(Some(VersionBump {
        from: current.to_string(),
        to,
        bump_type,
        commits: commits.to_vec(),
    }))
}

/// Returns the next version, or `None` if there is nothing to release.
///
/// # Errors
///
/// Propagates [`VersionError`] from [`compute_bump`].
pub fn get_next_version(
    current: &str,
    target: Option<Stage>,
    commits: &[Commit],
) -> Result<Option<String>, VersionError> {
    Ok(compute_bump(current, commits, target)?.map(|bump| bump.to))
}

/// Returns the `major.minor.patch` core of a version string.
///
/// # Errors
///
/// Returns [`VersionError::InvalidVersionFormat`] if `version` is not semver.
pub fn version_core(version: &str) -> Result<String, VersionError> {
    Ok(core(&parse_version(version)?).to_string())
}

pub(crate) fn parse_version(version: &str) -> Result<Version, VersionError> {
    let trimmed = version.trim();
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed))
        .map_err(|_| VersionError::invalid_format(version))
}

fn core(version: &Version) -> Version {
    Version::new(version.major, version.minor, version.patch)
}

fn with_stage(core: &Version, stage: Stage) -> Result<String, VersionError> {
    let mut version = core.clone();
    version.pre = Prerelease::new(&format!("{stage}.0"))
        .map_err(|_| VersionError::invalid_format(&core.to_string()))?;
    Ok(version.to_string())
}

fn increment_prerelease(current: &str) -> Result<String, VersionError> {
    let mut version = parse_version(current)?;
    if version.pre.is_empty() {
        return Err(VersionError::invalid_transition(
            current,
            current,
            "not a prerelease; use the normal bump flow",
        ));
    }

    let mut identifiers: Vec<String> = version.pre.as_str().split('.').map(str::to_string).collect();
    match identifiers.last().and_then(|last| last.parse::<u64>().ok()) {
        Some(counter) => {
            let next = counter
                .checked_add(1)
                .ok_or_else(|| VersionError::invalid_format(current))?;
            if let Some(last) = identifiers.last_mut() {
                *last = next.to_string();
            }
        }
        None => identifiers.push("0".to_string()),
    }

    version.pre =
        Prerelease::new(&identifiers.join(".")).map_err(|_| VersionError::invalid_format(current))?;
    version.build = BuildMetadata::EMPTY;
    Ok(version.to_string())
}
