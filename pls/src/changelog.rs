//! Changelog section of the release pull request.
//!
//! The rendered changelog is wrapped in `<!-- pls:changelog -->` and
//! `<!-- pls:changelog:end -->` so later runs can replace it in place.

use crate::store::Commit;
use crate::version::{is_breaking, parse_header};

/// Opening delimiter of the changelog section.
pub const CHANGELOG_START: &str = "<!-- pls:changelog -->";

/// Closing delimiter of the changelog section.
pub const CHANGELOG_END: &str = "<!-- pls:changelog:end -->";

/// Wraps a rendered changelog in its delimiters.
#[must_use]
pub fn changelog_section(changelog: &str) -> String {
    format!("{CHANGELOG_START}\n{changelog}\n{CHANGELOG_END}")
}

/// Replaces the changelog section of `text` with `section`, or returns
/// `None` when `text` has none.
#[must_use]
pub fn splice_changelog(text: &str, section: &str) -> Option<String> {
    let start = text.find(CHANGELOG_START)?;
    let after = start + CHANGELOG_START.len();
    let end = after + text[after..].find(CHANGELOG_END)?;

    let mut spliced = String::with_capacity(text.len() + section.len());
    spliced.push_str(&text[..start]);
    spliced.push_str(section);
    spliced.push_str(&text[end + CHANGELOG_END.len()..]);
    Some(spliced)
}

/// Renders the commits of a release as grouped markdown.
///
/// Groups appear in a fixed order and empty groups are omitted. Each line is
/// `- <description> (<short sha>)`.
#[must_use]
pub fn render_changelog(version: &str, commits: &[Commit]) -> String {
    let mut breaking = Vec::new();
    let mut features = Vec::new();
    let mut fixes = Vec::new();
    let mut other = Vec::new();

    for commit in commits {
        let header = parse_header(&commit.message);
        let description = header.as_ref().map_or_else(
            || commit.message.lines().next().unwrap_or_default().trim().to_string(),
            |h| match &h.scope {
                Some(scope) => format!("**{scope}:** {}", h.description),
                None => h.description.clone(),
            },
        );
        let line = format!("- {description} ({})", commit.short_sha());

        if is_breaking(&commit.message) {
            breaking.push(line);
            continue;
        }
        match header.as_ref().map(|h| h.kind.as_str()) {
            Some("feat") => features.push(line),
            Some("fix") => fixes.push(line),
            _ => other.push(line),
        }
    }

    let mut out = format!("## {version}");
    let groups = [
        ("Breaking Changes", breaking),
        ("Features", features),
        ("Bug Fixes", fixes),
        ("Other", other),
    ];
    let mut empty = true;
    for (title, lines) in groups {
        if lines.is_empty() {
            continue;
        }
        empty = false;
        out.push_str(&format!("\n\n### {title}\n\n{}", lines.join("\n")));
    }
    if empty {
        out.push_str("\n\nNo changes.");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splices_section_in_place() {
        let old = changelog_section("## 1.1.0\n\nNo changes.");
        let text = format!("Intro.\n\n{old}\n\nOutro.\n");
        let new = changelog_section("## 1.2.0\n\nNo changes.");

        assert_eq!(
            splice_changelog(&text, &new).unwrap(),
            format!("Intro.\n\n{new}\n\nOutro.\n")
        );
    }

    #[test]
    fn splice_without_section_is_none() {
        assert_eq!(splice_changelog("Intro.\n", "section"), None);
        assert_eq!(splice_changelog(CHANGELOG_END, "section"), None);
    }

    #[test]
    fn groups_commits_by_kind() {
        let commits = vec![
            Commit::new("aaaaaaa111", "feat: add X"),
            Commit::new("bbbbbbb222", "fix(parser): y"),
            Commit::new("ccccccc333", "refactor!: drop legacy api"),
            Commit::new("ddddddd444", "update readme\n\nlonger body"),
        ];

        assert_eq!(
            render_changelog("1.1.0", &commits),
            "## 1.1.0\n\n### Breaking Changes\n\n- drop legacy api (ccccccc)\n\n### Features\n\n- add X (aaaaaaa)\n\n### Bug Fixes\n\n- **parser:** y (bbbbbbb)\n\n### Other\n\n- update readme (ddddddd)"
        );
    }

    #[test]
    fn breaking_footer_moves_commit_to_breaking() {
        let commits = vec![Commit::new("eeeeeee555", "feat: new config\n\nBREAKING CHANGE: renamed keys")];
        let changelog = render_changelog("2.0.0", &commits);

        assert!(changelog.contains("### Breaking Changes\n\n- new config (eeeeeee)"));
        assert!(!changelog.contains("### Features"));
    }

    #[test]
    fn empty_release_says_so() {
        assert_eq!(render_changelog("1.0.1", &[]), "## 1.0.1\n\nNo changes.");
    }
}
