//! Conventional-commit header parsing.

use regex::Regex;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<kind>[A-Za-z]+)(?:\((?P<scope>[^)]*)\))?(?P<breaking>!)?:\s*(?P<description>.*)$")
        .unwrap()
});

/// Marker that flags a breaking change anywhere in a commit body.
pub const BREAKING_CHANGE_MARKER: &str = "BREAKING CHANGE:";

/// Parsed `type(scope)!: description` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalHeader {
    /// Commit type, lowercased (`feat`, `fix`, ...).
    pub kind: String,

    /// Optional scope between parentheses.
    pub scope: Option<String>,

    /// Whether the header carries `!`.
    pub breaking: bool,

    /// Text after the colon.
    pub description: String,
}

/// Parses the first line of a commit message as a conventional-commit header.
///
/// Returns `None` for messages that do not follow the convention.
#[must_use]
pub fn parse_header(message: &str) -> Option<ConventionalHeader> {
    let first_line = message.lines().next()?.trim();
    let captures = HEADER_RE.captures(first_line)?;

    Some(ConventionalHeader {
        kind: captures["kind"].to_lowercase(),
        scope: captures
            .name("scope")
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty()),
        breaking: captures.name("breaking").is_some(),
        description: captures["description"].trim().to_string(),
    })
}

/// Returns true when the message marks a breaking change, either with `!` in
/// the header or a `BREAKING CHANGE:` footer.
#[must_use]
pub fn is_breaking(message: &str) -> bool {
    parse_header(message).is_some_and(|h| h.breaking) || message.contains(BREAKING_CHANGE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_scope_and_bang() {
        let header = parse_header("feat(api)!: drop v1 endpoints").unwrap();
        assert_eq!(header.kind, "feat");
        assert_eq!(header.scope.as_deref(), Some("api"));
        assert!(header.breaking);
        assert_eq!(header.description, "drop v1 endpoints");
    }

    #[test]
    fn parses_plain_header() {
        let header = parse_header("fix: handle empty input\n\nlonger body").unwrap();
        assert_eq!(header.kind, "fix");
        assert_eq!(header.scope, None);
        assert!(!header.breaking);
        assert_eq!(header.description, "handle empty input");
    }

    #[test]
    fn lowercases_kind() {
        assert_eq!(parse_header("Feat: shout").unwrap().kind, "feat");
    }

    #[test]
    fn rejects_unconventional_messages() {
        assert_eq!(parse_header("Merge branch 'main'"), None);
        assert_eq!(parse_header(""), None);
    }

    #[test]
    fn detects_breaking_footer() {
        assert!(is_breaking("refactor: rework\n\nBREAKING CHANGE: config moved"));
        assert!(is_breaking("chore!: drop node 16"));
        assert!(!is_breaking("feat: new thing"));
    }
}
