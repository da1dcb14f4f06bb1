//! CVS log parser (cvs log)

use std::io::BufRead;
use std::sync::LazyLock;

use super::{Commit, DedupPolicy, LineMachine, LogParser, PendingEntry, fold_lines};
use crate::model::{ChangeLogEntry, ChangeLogFile};
use crate::scm::constants::markers::{CVS_FILE_END, REVISION_SEPARATOR};
use crate::scm::{DateFormat, ScmError};

const START_FILE: &str = "Working file: ";
const REVISION_TAG: &str = "revision ";
const DATE_TAG: &str = "date: ";
const AUTHOR_TAG: &str = "author: ";

/// Timestamp layouts written by older and newer CVS releases
static TIMESTAMP_FORMATS: LazyLock<[DateFormat; 2]> = LazyLock::new(|| {
    [
        DateFormat::new("yyyy/MM/dd HH:mm:ss").expect("Invalid cvs timestamp pattern"),
        DateFormat::new("yyyy-MM-dd HH:mm:ss Z").expect("Invalid cvs timestamp pattern"),
    ]
});

#[derive(Debug, Default)]
pub(crate) enum CvsState {
    /// Waiting for `Working file:`
    #[default]
    File,
    /// Waiting for `revision`
    Revision { entry: PendingEntry },
    /// Waiting for `date: ...; author: ...`
    Date { entry: PendingEntry },
    /// Collecting comment lines
    Comment { entry: PendingEntry },
}

/// Parser for `cvs log` output
#[derive(Debug, Default)]
pub struct CvsLogParser;

impl CvsLogParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_date(value: &str) -> Result<chrono::NaiveDateTime, ScmError> {
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| format.parse(value).ok())
            .ok_or_else(|| ScmError::unparseable_date(value))
    }

    fn commit(entry: PendingEntry) -> Option<Commit> {
        entry.into_entry().map(Commit::composite)
    }

    /// Name of the file a pending entry describes
    fn file_name(entry: &PendingEntry) -> String {
        entry
            .files
            .first()
            .map(|f| f.name.clone())
            .unwrap_or_default()
    }
}

impl LineMachine for CvsLogParser {
    type State = CvsState;

    fn policy(&self) -> DedupPolicy {
        DedupPolicy::Keyed
    }

    fn step(&self, state: CvsState, line: &str) -> Result<(CvsState, Option<Commit>), ScmError> {
        let next = match state {
            CvsState::File => match line.strip_prefix(START_FILE) {
                Some(name) => CvsState::Revision {
                    entry: PendingEntry::with_file(ChangeLogFile::new(name)),
                },
                None => CvsState::File,
            },

            CvsState::Revision { mut entry } => {
                if let Some(revision) = line.strip_prefix(REVISION_TAG) {
                    if let Some(file) = entry.files.first_mut() {
                        file.revision = revision.to_string();
                    }
                    CvsState::Date { entry }
                } else if line.starts_with(CVS_FILE_END) {
                    return Ok((CvsState::File, Self::commit(entry)));
                } else {
                    CvsState::Revision { entry }
                }
            }

            CvsState::Date { mut entry } => {
                if line.starts_with(DATE_TAG) {
                    // date: 2002/01/08 20:48:42;  author: dion;  state: Exp;
                    let mut fields = line.split(';');
                    let date = fields
                        .next()
                        .and_then(|f| f.trim().strip_prefix(DATE_TAG))
                        .unwrap_or_default()
                        .trim();
                    entry.date = Some(Self::parse_date(date)?);
                    entry.author = fields
                        .next()
                        .and_then(|f| f.trim().strip_prefix(AUTHOR_TAG))
                        .map(|a| a.trim().to_string());
                    CvsState::Comment { entry }
                } else {
                    CvsState::Date { entry }
                }
            }

            CvsState::Comment { mut entry } => {
                if line.starts_with(REVISION_SEPARATOR) {
                    let name = Self::file_name(&entry);
                    let next = PendingEntry::with_file(ChangeLogFile::new(name));
                    return Ok((CvsState::Revision { entry: next }, Self::commit(entry)));
                } else if line.starts_with(CVS_FILE_END) {
                    return Ok((CvsState::File, Self::commit(entry)));
                }
                entry.push_comment_line(line);
                CvsState::Comment { entry }
            }
        };
        Ok((next, None))
    }

    fn finish(&self, state: CvsState) -> Option<Commit> {
        match state {
            CvsState::Comment { entry } => Self::commit(entry),
            _ => None,
        }
    }
}

impl LogParser for CvsLogParser {
    fn parse(&mut self, input: &mut dyn BufRead) -> Result<Vec<ChangeLogEntry>, ScmError> {
        let entries = fold_lines(&*self, input)?;
        tracing::debug!(entries = entries.len(), "Parsed cvs log");
        Ok(entries)
    }
}
