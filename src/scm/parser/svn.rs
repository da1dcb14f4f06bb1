//! Subversion log parser (svn log -v)

use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use super::{Commit, DedupPolicy, LineMachine, LogParser, PendingEntry, fold_lines};
use crate::model::{ChangeLogEntry, ChangeLogFile};
use crate::scm::constants::markers::SVN_ENTRY_END;
use crate::scm::{DateFormat, ScmError};

const FILE_BEGIN_TOKEN: &str = " ";
const FILE_START_INDEX: usize = 5;

/// Matches the revision header:
/// `r1234 | author | 2002-08-26 14:33:26 -0400 (Mon, 26 Aug 2002) | 3 lines`
///
/// Captures: revision, author (possibly `(no author)`), local timestamp,
/// offset sign, offset hours, offset minutes.
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^r(\d+)\s+\|\s+(\(\S+\s+\S+\)|\S+)\s+\|\s+(\d+-\d+-\d+ \d+:\d+:\d+) ([\-+])(\d\d)(\d\d)",
    )
    .expect("Invalid svn header regex")
});

static TIMESTAMP_FORMAT: LazyLock<DateFormat> = LazyLock::new(|| {
    DateFormat::new("yyyy-MM-dd HH:mm:ss Z").expect("Invalid svn timestamp pattern")
});

#[derive(Debug, Default)]
pub(crate) enum SvnState {
    /// Waiting for `r<rev> | ...`
    #[default]
    Header,
    /// Collecting changed paths until the blank line
    Files { revision: String, entry: PendingEntry },
    /// Collecting the message until the dashed separator
    Comment { entry: PendingEntry },
}

/// Parser for `svn log -v` output
#[derive(Debug, Default)]
pub struct SvnLogParser;

impl SvnLogParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_header(line: &str) -> Result<Option<(String, PendingEntry)>, ScmError> {
        let Some(caps) = HEADER_REGEX.captures(line) else {
            return Ok(None);
        };
        let stamp = format!("{} {}{}{}", &caps[3], &caps[4], &caps[5], &caps[6]);
        let entry = PendingEntry {
            date: Some(TIMESTAMP_FORMAT.parse(&stamp)?),
            author: Some(caps[2].to_string()),
            ..Default::default()
        };
        Ok(Some((caps[1].to_string(), entry)))
    }
}

impl LineMachine for SvnLogParser {
    type State = SvnState;

    fn policy(&self) -> DedupPolicy {
        DedupPolicy::Sequential
    }

    fn step(&self, state: SvnState, line: &str) -> Result<(SvnState, Option<Commit>), ScmError> {
        let next = match state {
            SvnState::Header => match Self::parse_header(line)? {
                Some((revision, entry)) => SvnState::Files { revision, entry },
                None => SvnState::Header,
            },

            SvnState::Files {
                revision,
                mut entry,
            } => {
                if line.starts_with(FILE_BEGIN_TOKEN) {
                    // "   M /trunk/src/lib.rs": skip the action flags
                    let name = line.get(FILE_START_INDEX..).unwrap_or_default();
                    entry
                        .files
                        .push(ChangeLogFile::with_revision(name, revision.as_str()));
                    SvnState::Files { revision, entry }
                } else if line.is_empty() {
                    SvnState::Comment { entry }
                } else {
                    SvnState::Files { revision, entry }
                }
            }

            SvnState::Comment { mut entry } => {
                if line == SVN_ENTRY_END {
                    let commit = entry.into_entry().map(Commit::sequential);
                    return Ok((SvnState::Header, commit));
                }
                entry.push_comment_line(line);
                SvnState::Comment { entry }
            }
        };
        Ok((next, None))
    }

    fn finish(&self, state: SvnState) -> Option<Commit> {
        match state {
            SvnState::Comment { entry } => entry.into_entry().map(Commit::sequential),
            _ => None,
        }
    }
}

impl LogParser for SvnLogParser {
    fn parse(&mut self, input: &mut dyn BufRead) -> Result<Vec<ChangeLogEntry>, ScmError> {
        let entries = fold_lines(&*self, input)?;
        tracing::debug!(entries = entries.len(), "Parsed svn log");
        Ok(entries)
    }
}
