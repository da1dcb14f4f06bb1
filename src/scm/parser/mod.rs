//! SCM log parsers
//!
//! Every backend turns its client's text log into [`ChangeLogEntry`] values
//! with a line-oriented state machine. The state is an enum threaded through
//! a fold over the input lines; each transition may hand back one finished
//! commit, which an [`EntryCollector`] merges according to the backend's
//! dedup policy.

mod clearcase;
mod cvs;
mod perforce;
mod starteam;
mod svn;
mod vss;


pub use clearcase::ClearCaseLogParser;
pub use cvs::CvsLogParser;
pub use perforce::PerforceLogParser;
pub use starteam::StarteamLogParser;
pub use svn::SvnLogParser;
pub use vss::VssLogParser;

use std::collections::BTreeMap;
use std::io::BufRead;

use chrono::NaiveDateTime;

use super::ScmError;
use crate::model::{ChangeLogEntry, ChangeLogFile};

/// A backend log parser
pub trait LogParser {
    /// Override the timestamp pattern used inside the log
    ///
    /// Only backends whose clients print locale-dependent dates honour it.
    fn set_date_format_in_file(&mut self, _pattern: &str) -> Result<(), ScmError> {
        Ok(())
    }

    /// Parse a complete log
    fn parse(&mut self, input: &mut dyn BufRead) -> Result<Vec<ChangeLogEntry>, ScmError>;

    /// Release per-run resources
    fn cleanup(&mut self) -> Result<(), ScmError> {
        Ok(())
    }
}

/// How committed chunks are merged and ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DedupPolicy {
    /// Merge on key, newest key first
    Keyed,
    /// Keep log order, no merging
    Sequential,
}

/// Identity of a logical commit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum DedupKey {
    /// `yyyyMMddHHmm` + author + comment
    Composite(String),
    /// Perforce changelist number
    Changelist(u64),
}

/// A finished chunk handed from a transition to the collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Commit {
    pub key: Option<DedupKey>,
    pub entry: ChangeLogEntry,
}

impl Commit {
    /// Commit keyed on minute-rounded date, author and comment
    pub fn composite(entry: ChangeLogEntry) -> Self {
        let key = format!(
            "{}{}{}",
            entry.date.format("%Y%m%d%H%M"),
            entry.author,
            entry.comment
        );
        Self {
            key: Some(DedupKey::Composite(key)),
            entry,
        }
    }

    pub fn changelist(number: u64, entry: ChangeLogEntry) -> Self {
        Self {
            key: Some(DedupKey::Changelist(number)),
            entry,
        }
    }

    pub fn sequential(entry: ChangeLogEntry) -> Self {
        Self { key: None, entry }
    }
}

/// Accumulates committed chunks
#[derive(Debug)]
pub(crate) enum EntryCollector {
    Keyed(BTreeMap<DedupKey, ChangeLogEntry>),
    Sequential(Vec<ChangeLogEntry>),
}

impl EntryCollector {
    pub fn new(policy: DedupPolicy) -> Self {
        match policy {
            DedupPolicy::Keyed => EntryCollector::Keyed(BTreeMap::new()),
            DedupPolicy::Sequential => EntryCollector::Sequential(Vec::new()),
        }
    }

    pub fn push(&mut self, commit: Commit) {
        match (self, commit.key) {
            (EntryCollector::Keyed(entries), Some(key)) => match entries.get_mut(&key) {
                Some(existing) => existing.merge_files(commit.entry),
                None => {
                    entries.insert(key, commit.entry);
                }
            },
            (EntryCollector::Keyed(_), None) => {
                tracing::debug!("Dropping unkeyed entry in keyed collector");
            }
            (EntryCollector::Sequential(entries), _) => entries.push(commit.entry),
        }
    }

    pub fn into_entries(self) -> Vec<ChangeLogEntry> {
        match self {
            EntryCollector::Keyed(entries) => entries.into_values().rev().collect(),
            EntryCollector::Sequential(entries) => entries,
        }
    }
}

/// An entry under construction
///
/// Becomes a [`ChangeLogEntry`] only once both author and date are known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct PendingEntry {
    pub date: Option<NaiveDateTime>,
    pub author: Option<String>,
    pub comment: String,
    pub files: Vec<ChangeLogFile>,
}

impl PendingEntry {
    pub fn with_file(file: ChangeLogFile) -> Self {
        Self {
            files: vec![file],
            ..Default::default()
        }
    }

    /// Append one comment line, newline-terminated
    pub fn push_comment_line(&mut self, line: &str) {
        self.comment.push_str(line);
        self.comment.push('\n');
    }

    pub fn into_entry(self) -> Option<ChangeLogEntry> {
        let (Some(date), Some(author)) = (self.date, self.author) else {
            return None;
        };
        let mut entry = ChangeLogEntry::new(date, author, self.comment);
        entry.files = self.files;
        Some(entry)
    }
}

/// A line-oriented state machine
pub(crate) trait LineMachine {
    type State: Default;

    fn policy(&self) -> DedupPolicy;

    /// One transition: consume `line`, maybe emit a finished commit
    fn step(
        &self,
        state: Self::State,
        line: &str,
    ) -> Result<(Self::State, Option<Commit>), ScmError>;

    /// Flush whatever is pending at end of input
    fn finish(&self, state: Self::State) -> Option<Commit>;
}

/// Drive a [`LineMachine`] over every line of `input`
pub(crate) fn fold_lines<M: LineMachine>(
    machine: &M,
    input: &mut dyn BufRead,
) -> Result<Vec<ChangeLogEntry>, ScmError> {
    let mut collector = EntryCollector::new(machine.policy());

    let state = lossy_lines(input).try_fold(M::State::default(), |state, line| {
        let (next, commit) = machine.step(state, &line?)?;
        if let Some(commit) = commit {
            collector.push(commit);
        }
        Ok::<_, ScmError>(next)
    })?;

    if let Some(commit) = machine.finish(state) {
        collector.push(commit);
    }

    Ok(collector.into_entries())
}

/// Lines without terminators, decoding invalid UTF-8 lossily
fn lossy_lines(input: &mut dyn BufRead) -> impl Iterator<Item = Result<String, ScmError>> + '_ {
    let mut buf = Vec::new();
    std::iter::from_fn(move || {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
            }
            Err(e) => Some(Err(ScmError::IoError(e))),
        }
    })
}
