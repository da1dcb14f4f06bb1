//! ClearCase log parser (cleartool lshistory)
//!
//! The generator asks `cleartool` for one record per version, laid out as
//! `NAME:` / `DATE:` / `COMM:` (plus continuation lines) / `USER:`.

use std::io::BufRead;
use std::sync::LazyLock;

use super::{Commit, DedupPolicy, LineMachine, LogParser, PendingEntry, fold_lines};
use crate::model::{ChangeLogEntry, ChangeLogFile};
use crate::scm::{DateFormat, ScmError};

const NAME_TAG: &str = "NAME:";
const DATE_TAG: &str = "DATE:";
const COMMENT_TAG: &str = "COMM:";
const USER_TAG: &str = "USER:";

/// Only checkin events make it into the change log
const CHECKIN_OPERATION: &str = "checkin ";

/// `%Nd` renders as `yyyyMMdd.HHmmss` regardless of locale
static TIMESTAMP_FORMAT: LazyLock<DateFormat> = LazyLock::new(|| {
    DateFormat::new("yyyyMMdd.HHmmss").expect("Invalid clearcase timestamp pattern")
});

#[derive(Debug, Default)]
pub(crate) enum ClearCaseState {
    #[default]
    File,
    Date { entry: PendingEntry },
    CommentAndUser { entry: PendingEntry },
}

/// Parser for `cleartool lshistory -fmt ...` output
#[derive(Debug, Default)]
pub struct ClearCaseLogParser;

impl ClearCaseLogParser {
    pub fn new() -> Self {
        Self
    }

    fn commit(entry: PendingEntry) -> Option<Commit> {
        if !entry.comment.contains(CHECKIN_OPERATION) {
            return None;
        }
        entry.into_entry().map(Commit::composite)
    }
}

impl LineMachine for ClearCaseLogParser {
    type State = ClearCaseState;

    fn policy(&self) -> DedupPolicy {
        DedupPolicy::Keyed
    }

    fn step(
        &self,
        state: ClearCaseState,
        line: &str,
    ) -> Result<(ClearCaseState, Option<Commit>), ScmError> {
        let next = match state {
            ClearCaseState::File => match line.strip_prefix(NAME_TAG) {
                // Revision stays blank, the version id is part of the name
                Some(name) => ClearCaseState::Date {
                    entry: PendingEntry::with_file(ChangeLogFile::new(name)),
                },
                None => ClearCaseState::File,
            },

            ClearCaseState::Date { mut entry } => match line.strip_prefix(DATE_TAG) {
                Some(stamp) => {
                    entry.date = Some(TIMESTAMP_FORMAT.parse(stamp)?);
                    ClearCaseState::CommentAndUser { entry }
                }
                None => ClearCaseState::Date { entry },
            },

            ClearCaseState::CommentAndUser { mut entry } => {
                if let Some(comment) = line.strip_prefix(COMMENT_TAG) {
                    entry.push_comment_line(comment);
                } else if let Some(user) = line.strip_prefix(USER_TAG) {
                    entry.author = Some(user.trim().to_string());
                    return Ok((ClearCaseState::File, Self::commit(entry)));
                } else {
                    entry.push_comment_line(line);
                }
                ClearCaseState::CommentAndUser { entry }
            }
        };
        Ok((next, None))
    }

    fn finish(&self, _state: ClearCaseState) -> Option<Commit> {
        // A record without USER: never has an author
        None
    }
}

impl LogParser for ClearCaseLogParser {
    fn parse(&mut self, input: &mut dyn BufRead) -> Result<Vec<ChangeLogEntry>, ScmError> {
        let entries = fold_lines(&*self, input)?;
        tracing::debug!(entries = entries.len(), "Parsed clearcase history");
        Ok(entries)
    }
}
