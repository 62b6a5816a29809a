//! Version picker embedded in a pull request description.
//!
//! The block sits between `<!-- pls:options -->` and
//! `<!-- pls:options:end -->`. The current choice is a bold line without a
//! checkbox, so the status quo cannot be re-selected by accident. Every
//! alternative is a markdown checkbox. Each line carries a hidden marker
//! `<!-- pls:v:<version>:<type>[:current|:disabled:<reason>] -->` that the
//! parser reads instead of the visible text.
//!
//! Parsing is tolerant: a missing or malformed block yields `None` and
//! malformed lines are skipped. [`render`] is the inverse of [`parse`] for
//! well-formed input.

mod menu;
mod option;

pub use menu::build_options;
pub use option::{ParsedOptions, VersionOption};

use crate::version::BumpType;
use regex::Regex;
use std::sync::LazyLock;

/// Opening delimiter of the options block.
pub const OPTIONS_START: &str = "<!-- pls:options -->";

/// Closing delimiter of the options block.
pub const OPTIONS_END: &str = "<!-- pls:options:end -->";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<!--\s*pls:v:(?P<version>[^:\s]+):(?P<kind>[a-z]+)(?::(?P<flag>current|disabled)(?::(?P<reason>.*?))?)?\s*-->",
    )
    .unwrap()
});

static CHECKBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s+\[(?P<mark>[ xX])\]").unwrap());

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((?P<label>[^()]*)\)\s*$").unwrap());

/// Renders options as a delimited block.
///
/// The first selected, enabled option becomes the current line; all others
/// are rendered as unchecked alternatives in their given order.
#[must_use]
pub fn render(options: &[VersionOption]) -> String {
    let mut lines = vec![OPTIONS_START.to_string()];
    let current = options.iter().position(|o| o.selected && !o.disabled);

    if let Some(option) = current.map(|i| &options[i]) {
        lines.push(format!(
            "**Current: {}** ({}) <!-- pls:v:{}:{}:current -->",
            option.version, option.label, option.version, option.bump_type
        ));
    }

    let alternatives: Vec<&VersionOption> = options
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != current)
        .map(|(_, o)| o)
        .collect();

    if !alternatives.is_empty() {
        if current.is_some() {
            lines.push(String::new());
        }
        lines.push("**Switch to** (check one):".to_string());
        lines.extend(alternatives.into_iter().map(render_alternative));
    }

    lines.push(OPTIONS_END.to_string());
    lines.join("\n")
}

fn render_alternative(option: &VersionOption) -> String {
    if option.disabled {
        let reason = option.disabled_reason.as_deref().unwrap_or_default().replace("-->", "");
        format!(
            "- [ ] ~~{}~~ ({}) <!-- pls:v:{}:{}:disabled:{} -->",
            option.version, option.label, option.version, option.bump_type, reason
        )
    } else {
        format!(
            "- [ ] {} ({}) <!-- pls:v:{}:{} -->",
            option.version, option.label, option.version, option.bump_type
        )
    }
}

/// Parses the options block out of `text`.
///
/// Returns `None` if either delimiter is missing or they are out of order.
/// The first checked, enabled alternative in document order wins the
/// selection; otherwise the current line stays selected.
#[must_use]
pub fn parse(text: &str) -> Option<ParsedOptions> {
    let (start, end) = block_span(text)?;
    let inner = &text[start + OPTIONS_START.len()..end];

    let mut options: Vec<VersionOption> = Vec::new();
    let mut current_index = None;
    let mut checked_index = None;

    for line in inner.lines() {
        let Some(marker) = MARKER_RE.captures(line) else {
            continue;
        };
        let Some(bump_type) = BumpType::parse(&marker["kind"]) else {
            continue;
        };

        let prefix = &line[..marker.get(0).map_or(0, |m| m.start())];
        let label = LABEL_RE
            .captures(prefix.trim_end())
            .map(|c| c["label"].to_string())
            .unwrap_or_default();
        let mut option = VersionOption::new(&marker["version"], bump_type, label);

        match marker.name("flag").map(|m| m.as_str()) {
            Some("current") if current_index.is_none() => {
                current_index = Some(options.len());
                options.push(option);
                continue;
            }
            Some("disabled") => {
                let reason = marker.name("reason").map_or("", |m| m.as_str()).trim();
                option = option.disabled(reason);
            }
            _ => {}
        }

        let Some(checkbox) = CHECKBOX_RE.captures(line) else {
            continue;
        };
        let checked = !checkbox["mark"].trim().is_empty();
        if checked && !option.disabled && checked_index.is_none() {
            checked_index = Some(options.len());
        }
        options.push(option);
    }

    let selected_index = checked_index.or(current_index);
    for (i, option) in options.iter_mut().enumerate() {
        option.selected = Some(i) == selected_index;
    }

    Some(ParsedOptions {
        selected: selected_index.map(|i| options[i].clone()),
        current: current_index.map(|i| options[i].clone()),
        options,
    })
}

/// Marks `new_version` as the current choice and re-renders the block in
/// place. Text outside the block is returned unchanged.
///
/// Returns `text` untouched if there is no block, or if `new_version` is
/// absent or disabled.
#[must_use]
pub fn update(text: &str, new_version: &str) -> String {
    let Some(parsed) = parse(text) else {
        return text.to_string();
    };
    if !parsed
        .options
        .iter()
        .any(|o| o.version == new_version && !o.disabled)
    {
        return text.to_string();
    }

    let mut marked = false;
    let options: Vec<VersionOption> = parsed
        .options
        .into_iter()
        .map(|mut option| {
            option.selected = !marked && option.version == new_version && !option.disabled;
            marked |= option.selected;
            option
        })
        .collect();

    splice(text, &render(&options)).unwrap_or_else(|| text.to_string())
}

/// Returns true if the derived selection differs between two texts.
///
/// Unparseable input on either side counts as unchanged.
#[must_use]
pub fn has_selection_changed(old_text: &str, new_text: &str) -> bool {
    match (parse(old_text), parse(new_text)) {
        (Some(old), Some(new)) => {
            old.selected.map(|o| o.version) != new.selected.map(|o| o.version)
        }
        _ => false,
    }
}

/// Replaces the options block in `text` with `block`, or returns `None`
/// when `text` has no block.
#[must_use]
pub fn splice(text: &str, block: &str) -> Option<String> {
    let (start, end) = block_span(text)?;
    let mut spliced = String::with_capacity(text.len() + block.len());
    spliced.push_str(&text[..start]);
    spliced.push_str(block);
    spliced.push_str(&text[end + OPTIONS_END.len()..]);
    Some(spliced)
}

/// Byte offsets of the opening delimiter and of the closing delimiter.
fn block_span(text: &str) -> Option<(usize, usize)> {
    let start = text.find(OPTIONS_START)?;
    let after = start + OPTIONS_START.len();
    let end = after + text[after..].find(OPTIONS_END)?;
    Some((start, end))
}
