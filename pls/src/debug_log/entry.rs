//! A single debug log entry.

use chrono::Utc;

/// One diagnostic record kept in the pull request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    /// Display timestamp, rendered verbatim.
    pub timestamp: String,

    /// Free-text label of the command that produced the entry.
    pub command: String,

    /// Key/value details in insertion order.
    pub details: Vec<(String, String)>,
}

impl DebugEntry {
    /// Creates an entry stamped with the current UTC time.
    pub fn new(command: impl Into<String>) -> Self {
        Self::at(Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(), command)
    }

    /// Creates an entry with an explicit timestamp.
    pub fn at(timestamp: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            command: command.into(),
            details: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.details.push((key.into(), value.to_string()));
        self
    }

    /// Appends a detail in place.
    pub fn push_detail(&mut self, key: impl Into<String>, value: impl ToString) {
        self.details.push((key.into(), value.to_string()));
    }

    /// Returns the first value recorded under `key`.
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn render(&self) -> String {
        // The header wraps the command in backticks and must stay on one line.
        let command = self.command.replace('`', "'").replace(['\r', '\n'], " ");
        let mut out = format!("### {} — `{command}`", self.timestamp);
        for (key, value) in &self.details {
            // Entries are line-oriented; multi-line values are folded.
            let value = value.replace(['\r', '\n'], " ");
            out.push_str(&format!("\n- **{key}**: {value}"));
        }
        out
    }
}
