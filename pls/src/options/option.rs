//! Selectable version options.

use crate::version::BumpType;

/// One entry of the version picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOption {
    pub version: String,
    pub bump_type: BumpType,
    pub label: String,
    pub selected: bool,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
}

impl VersionOption {
    /// Creates an enabled, unselected option.
    pub fn new(version: impl Into<String>, bump_type: BumpType, label: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            bump_type,
            label: label.into(),
            selected: false,
            disabled: false,
            disabled_reason: None,
        }
    }

    #[must_use]
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    #[must_use]
    pub fn disabled(mut self, reason: impl Into<String>) -> Self {
        self.disabled = true;
        self.selected = false;
        self.disabled_reason = Some(reason.into());
        self
    }
}

/// Result of reading an options block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedOptions {
    /// Every option in document order, the current line first.
    pub options: Vec<VersionOption>,

    /// The effective choice: the first checked enabled alternative, else the
    /// current line.
    pub selected: Option<VersionOption>,

    /// The option rendered as the status quo, if the block had one.
    pub current: Option<VersionOption>,
}

impl ParsedOptions {
    /// Returns true when a checked alternative overrides the current line.
    #[must_use]
    pub fn is_user_choice(&self) -> bool {
        match (&self.selected, &self.current) {
            (Some(selected), Some(current)) => selected.version != current.version,
            (Some(_), None) => true,
            _ => false,
        }
    }
}
