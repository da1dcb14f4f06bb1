//! Change log entry data model

use chrono::{NaiveDateTime, Timelike};

/// A single file touched by a commit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeLogFile {
    /// Path of the file, relative to whatever root the backend reports
    pub name: String,

    /// Backend-specific revision token (may be empty)
    pub revision: String,
}

impl ChangeLogFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: String::new(),
        }
    }

    pub fn with_revision(name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
        }
    }
}

/// One logical commit: who, when, why and which files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogEntry {
    /// Commit timestamp, second precision
    pub date: NaiveDateTime,

    /// Committer name as reported by the SCM
    pub author: String,

    /// Commit message, possibly spanning several lines
    pub comment: String,

    /// Files in encounter order
    pub files: Vec<ChangeLogFile>,
}

impl ChangeLogEntry {
    pub fn new(date: NaiveDateTime, author: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            date: date.with_nanosecond(0).unwrap_or(date),
            author: author.into(),
            comment: comment.into(),
            files: Vec::new(),
        }
    }

    pub fn add_file(&mut self, file: ChangeLogFile) {
        self.files.push(file);
    }

    /// Append the files of another chunk of the same logical commit
    pub fn merge_files(&mut self, other: ChangeLogEntry) {
        self.files.extend(other.files);
    }

    /// Date part as `yyyy-MM-dd`
    pub fn date_formatted(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Time part as `HH:mm:ss`
    pub fn time_formatted(&self) -> String {
        self.date.format("%H:%M:%S").to_string()
    }
}
