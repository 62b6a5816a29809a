//! Builds the option menu for a computed bump.

use super::VersionOption;
use crate::version::{parse_version, version_core, BumpType, Stage, VersionBump, VersionError};

/// Builds the options offered for a release.
///
/// From a stable version the menu holds the computed bump plus entering
/// alpha, beta or rc on the same core. From a prerelease it holds the next
/// counter, every later stage and stable; earlier stages are listed but
/// disabled. `selected`, when given, becomes the marked option (inserted if
/// the menu lacks it); otherwise the computed bump is marked.
///
/// # Errors
///
/// Returns [`VersionError::InvalidVersionFormat`] if `current` or the bump
/// target is not semver.
pub fn build_options(
    current: &str,
    bump: &VersionBump,
    selected: Option<&VersionOption>,
) -> Result<Vec<VersionOption>, VersionError> {
    let parsed = parse_version(current)?;
    let mut options = Vec::new();

    match Stage::of(&parsed) {
        Some(Stage::Stable) => {
            let core = version_core(&bump.to)?;
            let class = if bump.bump_type == BumpType::Transition {
                crate::version::classify(&bump.commits).unwrap_or(BumpType::Minor)
            } else {
                bump.bump_type
            };
            options.push(VersionOption::new(&core, class, class.as_str()));
            for stage in Stage::PRERELEASE {
                options.push(VersionOption::new(
                    format!("{core}-{stage}.0"),
                    BumpType::Transition,
                    stage.as_str(),
                ));
            }
        }
        Some(from) => {
            let core = version_core(current)?;
            options.push(VersionOption::new(
                crate::version::next_version(current, BumpType::Transition)?,
                BumpType::Transition,
                from.as_str(),
            ));
            for stage in Stage::PRERELEASE {
                let option = VersionOption::new(format!("{core}-{stage}.0"), BumpType::Transition, stage.as_str());
                if stage < from {
                    options.push(option.disabled(format!("cannot go back from {from}")));
                } else if stage > from {
                    options.push(option);
                }
            }
            options.push(VersionOption::new(&core, BumpType::Transition, Stage::Stable.as_str()));
        }
        None => {
            options.push(VersionOption::new(
                crate::version::next_version(current, BumpType::Transition)?,
                BumpType::Transition,
                "prerelease",
            ));
            let core = version_core(current)?;
            options.push(VersionOption::new(&core, BumpType::Transition, Stage::Stable.as_str()));
        }
    }

    if !options.iter().any(|o| o.version == bump.to) {
        options.insert(0, VersionOption::new(&bump.to, bump.bump_type, label_for(bump)?));
    }

    let chosen = selected.map_or(bump.to.as_str(), |s| s.version.as_str()).to_string();
    match options.iter_mut().find(|o| o.version == chosen && !o.disabled) {
        Some(option) => option.selected = true,
        None => match selected {
            Some(selection) => {
                let mut option = selection.clone();
                option.selected = true;
                option.disabled = false;
                option.disabled_reason = None;
                options.retain(|o| o.version != option.version);
                options.insert(0, option);
            }
            None => {
                if let Some(option) = options.iter_mut().find(|o| o.version == bump.to) {
                    option.selected = true;
                }
            }
        },
    }

    Ok(options)
}

fn label_for(bump: &VersionBump) -> Result<String, VersionError> {
    if bump.bump_type != BumpType::Transition {
        return Ok(bump.bump_type.as_str().to_string());
    }
    let target = parse_version(&bump.to)?;
    Ok(Stage::of(&target).map_or("prerelease", Stage::as_str).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Commit;

    fn bump(from: &str, to: &str, bump_type: BumpType) -> VersionBump {
        VersionBump {
            from: from.to_string(),
            to: to.to_string(),
            bump_type,
            commits: vec![Commit::new("a", "feat: x")],
        }
    }

    fn versions(options: &[VersionOption]) -> Vec<&str> {
        options.iter().map(|o| o.version.as_str()).collect()
    }

    #[test]
    fn stable_menu_offers_prerelease_entries() {
        let options = build_options("1.0.0", &bump("1.0.0", "1.1.0", BumpType::Minor), None).unwrap();

        assert_eq!(
            versions(&options),
            ["1.1.0", "1.1.0-alpha.0", "1.1.0-beta.0", "1.1.0-rc.0"]
        );
        assert!(options[0].selected);
        assert_eq!(options[0].label, "minor");
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn prerelease_menu_disables_earlier_stages() {
        let options = build_options(
            "1.1.0-beta.2",
            &bump("1.1.0-beta.2", "1.1.0-beta.3", BumpType::Transition),
            None,
        )
        .unwrap();

        assert_eq!(
            versions(&options),
            ["1.1.0-beta.3", "1.1.0-alpha.0", "1.1.0-rc.0", "1.1.0"]
        );
        assert!(options[0].selected);
        assert_eq!(options[0].label, "beta");
        assert!(options[1].disabled);
        assert_eq!(options[1].disabled_reason.as_deref(), Some("cannot go back from beta"));
        assert_eq!(options[3].label, "stable");
    }

    #[test]
    fn honours_selection_from_menu() {
        let choice = VersionOption::new("1.1.0-alpha.0", BumpType::Transition, "alpha");
        let options = build_options(
            "1.0.0",
            &bump("1.0.0", "1.1.0", BumpType::Minor),
            Some(&choice),
        )
        .unwrap();

        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].version, "1.1.0-alpha.0");
    }

    #[test]
    fn inserts_selection_missing_from_menu() {
        let choice = VersionOption::new("3.0.0", BumpType::Major, "major");
        let options = build_options(
            "1.0.0",
            &bump("1.0.0", "1.1.0", BumpType::Minor),
            Some(&choice),
        )
        .unwrap();

        assert_eq!(options[0].version, "3.0.0");
        assert!(options[0].selected);
        assert!(!options[1].selected);
    }

    #[test]
    fn explicit_transition_from_stable_is_marked() {
        let options = build_options(
            "1.0.0",
            &bump("1.0.0", "1.1.0-alpha.0", BumpType::Transition),
            None,
        )
        .unwrap();

        let selected = options.iter().find(|o| o.selected).unwrap();
        assert_eq!(selected.version, "1.1.0-alpha.0");
        assert_eq!(options[0].version, "1.1.0");
        assert_eq!(options[0].bump_type, BumpType::Minor);
    }
}
