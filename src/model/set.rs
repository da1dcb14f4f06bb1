//! Change set data model

use super::ChangeLogEntry;

/// Entries collected between two markers (dates or tags)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeLogSet {
    entries: Vec<ChangeLogEntry>,
    start: String,
    end: Option<String>,
}

impl ChangeLogSet {
    /// Build a set; an empty end marker means "until present"
    pub fn new(entries: Vec<ChangeLogEntry>, start: impl Into<String>, end: Option<String>) -> Self {
        Self {
            entries,
            start: start.into(),
            end: end.filter(|e| !e.is_empty()),
        }
    }

    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display string for the end marker
    pub fn end_display(&self) -> &str {
        self.end.as_deref().unwrap_or("present")
    }
}
