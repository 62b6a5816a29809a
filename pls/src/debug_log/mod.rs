//! Bounded diagnostic log embedded in a pull request body.
//!
//! Entries live between `<!-- pls:debug -->` and `<!-- pls:debug:end -->`,
//! wrapped in a collapsed `<details>` section. Only the most recent
//! [`MAX_ENTRIES`] are kept. Nothing reads this block for decisions.

mod entry;

pub use entry::DebugEntry;

use regex::Regex;
use std::sync::LazyLock;

/// Opening delimiter of the debug block.
pub const DEBUG_START: &str = "<!-- pls:debug -->";

/// Closing delimiter of the debug block.
pub const DEBUG_END: &str = "<!-- pls:debug:end -->";

/// Number of entries retained.
pub const MAX_ENTRIES: usize = 10;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^###\s+(?P<timestamp>.+?)\s+—\s+`(?P<command>[^`]*)`\s*$").unwrap());

static DETAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s+\*\*(?P<key>[^*]+)\*\*:\s?(?P<value>.*)$").unwrap());

/// Reads all entries from the debug block of `text`.
///
/// A missing block yields no entries. An entry with a malformed header is
/// skipped along with its detail lines.
#[must_use]
pub fn parse(text: &str) -> Vec<DebugEntry> {
    let Some((start, end)) = block_span(text) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut current: Option<DebugEntry> = None;
    let mut skipping = false;

    for line in text[start + DEBUG_START.len()..end].lines() {
        if line.starts_with("###") {
            entries.extend(current.take());
            match HEADER_RE.captures(line) {
                Some(header) => {
                    current = Some(DebugEntry::at(&header["timestamp"], &header["command"]));
                    skipping = false;
                }
                None => skipping = true,
            }
            continue;
        }

        if skipping {
            continue;
        }
        if let (Some(entry), Some(detail)) = (current.as_mut(), DETAIL_RE.captures(line)) {
            entry.push_detail(detail["key"].trim(), detail["value"].trim_end());
        }
    }
    entries.extend(current);

    entries
}

/// Appends `entry` to the debug block of `text`, dropping the oldest
/// entries beyond [`MAX_ENTRIES`].
#[must_use]
pub fn append(text: &str, entry: DebugEntry) -> String {
    let mut entries = parse(text);
    entries.push(entry);
    write(text, &entries)
}

/// Replaces the debug block of `text` with `entries`, keeping the most
/// recent [`MAX_ENTRIES`].
///
/// When `text` has no block, a new collapsible section is appended at the
/// end.
#[must_use]
pub fn write(text: &str, entries: &[DebugEntry]) -> String {
    let kept = &entries[entries.len().saturating_sub(MAX_ENTRIES)..];
    let block = render_block(kept);

    match block_span(text) {
        Some((start, end)) => {
            let mut out = String::with_capacity(text.len() + block.len());
            out.push_str(&text[..start]);
            out.push_str(&block);
            out.push_str(&text[end + DEBUG_END.len()..]);
            out
        }
        None => {
            let section = format!("<details>\n<summary>Debug Log</summary>\n\n{block}\n\n</details>");
            let body = text.trim_end();
            if body.is_empty() {
                format!("{section}\n")
            } else {
                format!("{body}\n\n{section}\n")
            }
        }
    }
}

fn render_block(entries: &[DebugEntry]) -> String {
    let rendered: Vec<String> = entries.iter().map(DebugEntry::render).collect();
    if rendered.is_empty() {
        format!("{DEBUG_START}\n{DEBUG_END}")
    } else {
        format!("{DEBUG_START}\n{}\n{DEBUG_END}", rendered.join("\n\n"))
    }
}

fn block_span(text: &str) -> Option<(usize, usize)> {
    let start = text.find(DEBUG_START)?;
    let after = start + DEBUG_START.len();
    let end = after + text[after..].find(DEBUG_END)?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> DebugEntry {
        DebugEntry::at(format!("2024-05-01 10:00:{n:02} UTC"), "sync").with_detail("run", n)
    }

    #[test]
    fn creates_section_at_end_of_text() {
        let text = append("Release notes.\n", entry(1));

        assert!(text.starts_with("Release notes.\n\n<details>\n<summary>Debug Log</summary>"));
        assert!(text.trim_end().ends_with("</details>"));
        assert_eq!(parse(&text), vec![entry(1)]);
    }

    #[test]
    fn appends_in_order() {
        let text = append(&append("", entry(1)), entry(2));

        assert_eq!(parse(&text), vec![entry(1), entry(2)]);
    }

    #[test]
    fn keeps_most_recent_ten() {
        let mut text = String::from("body");
        for n in 0..MAX_ENTRIES {
            text = append(&text, entry(n));
        }
        assert_eq!(parse(&text).len(), MAX_ENTRIES);

        let text = append(&text, entry(MAX_ENTRIES));
        let entries = parse(&text);

        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries.first(), Some(&entry(1)));
        assert_eq!(entries.last(), Some(&entry(MAX_ENTRIES)));
    }

    #[test]
    fn preserves_text_around_existing_block() {
        let text = append("intro", entry(1));
        let text = format!("{text}\nfooter");
        let updated = append(&text, entry(2));

        assert!(updated.starts_with("intro\n\n<details>"));
        assert!(updated.ends_with("</details>\n\nfooter"));
        assert_eq!(updated.matches("<summary>Debug Log</summary>").count(), 1);
    }

    #[test]
    fn skips_entries_with_malformed_headers() {
        let text = format!(
            "{DEBUG_START}\n### broken header\n- **lost**: yes\n\n### t1 — `sync`\n- **kept**: yes\n{DEBUG_END}"
        );
        let entries = parse(&text);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].command, "sync");
        assert_eq!(entries[0].detail("kept"), Some("yes"));
        assert_eq!(entries[0].detail("lost"), None);
    }

    #[test]
    fn missing_block_parses_empty() {
        assert!(parse("nothing here").is_empty());
        assert!(parse(&format!("{DEBUG_START} unterminated")).is_empty());
    }
}
