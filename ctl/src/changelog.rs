use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::block::Lines;

/// Indentation of change log files written by earlier versions of the tool.
pub const DEFAULT_INDENT: usize = 4;

/// One recorded block update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// ISO-8601 time of the update. Only used for reporting.
    pub timestamp: String,
    pub block_name: String,
    /// Every occurrence the block had before the update.
    #[serde(alias = "orginal_content")]
    pub original_content: Vec<Lines>,
    pub updated_content: Lines,
}

/// Append-only history of block updates, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: Vec<ChangeLogEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an update stamped with the current local time.
    pub fn log_change(&mut self, block_name: &str, original: Vec<Lines>, updated: Lines) {
        self.log_change_at(timestamp_now(), block_name, original, updated);
    }

    pub fn log_change_at(
        &mut self,
        timestamp: impl Into<String>,
        block_name: &str,
        original: Vec<Lines>,
        updated: Lines,
    ) {
        self.entries.push(ChangeLogEntry {
            timestamp: timestamp.into(),
            block_name: block_name.to_string(),
            original_content: original,
            updated_content: updated,
        });
    }

    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a JSON array of records, indented by `indent` spaces.
    pub fn to_json(&self, indent: usize) -> serde_json::Result<String> {
        let indent = " ".repeat(indent);
        let mut buf = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
    }

    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a ChangeLogEntry;
    type IntoIter = std::slice::Iter<'a, ChangeLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Current local time as an ISO-8601 string with microsecond precision.
pub fn timestamp_now() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
