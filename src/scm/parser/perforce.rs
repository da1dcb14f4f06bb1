//! Perforce log parser (p4 filelog -tl)

use std::io::BufRead;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use super::{Commit, DedupPolicy, LineMachine, LogParser, PendingEntry, fold_lines};
use crate::model::{ChangeLogEntry, ChangeLogFile};
use crate::scm::{DateFormat, ScmError};

const FILE_BEGIN_TOKEN: &str = "//";

/// Matches a revision line:
/// `... #1 change 1 add on 2003/10/15 13:38:40 by jim@jim-desktop (text)`
///
/// Captures: file revision, changelist, timestamp, user.
static REVISION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\.\. #(\d+) change (\d+) .* on (.*) by (.*)@")
        .expect("Invalid perforce revision regex")
});

static TIMESTAMP_FORMAT: LazyLock<DateFormat> = LazyLock::new(|| {
    DateFormat::new("yyyy/MM/dd HH:mm:ss").expect("Invalid perforce timestamp pattern")
});

#[derive(Debug)]
pub(crate) struct PendingRevision {
    revision: String,
    changelist: u64,
    entry: PendingEntry,
}

#[derive(Debug, Default)]
pub(crate) enum PerforcePhase {
    /// Waiting for a depot path or a revision line
    #[default]
    Revision,
    /// The line right after the revision line is skipped
    CommentBegin(PendingRevision),
    /// Collecting the description until a blank line
    Comment(PendingRevision),
}

/// Parser state: the current depot file survives across revisions
#[derive(Debug, Default)]
pub(crate) struct PerforceState {
    file: String,
    phase: PerforcePhase,
}

/// Parser for `p4 filelog -tl` output
#[derive(Debug, Default)]
pub struct PerforceLogParser {
    /// Characters stripped from the front of depot paths
    prefix_len: usize,
    /// Revisions older than this are ignored
    cutoff: Option<NaiveDateTime>,
}

impl PerforceLogParser {
    /// `prefix_len` is the length of the filespec's directory part,
    /// e.g. `//depot/projects/name/` for `//depot/projects/name/...`
    pub fn new(prefix_len: usize, cutoff: Option<NaiveDateTime>) -> Self {
        Self { prefix_len, cutoff }
    }

    fn parse_revision(line: &str) -> Result<Option<PendingRevision>, ScmError> {
        let Some(caps) = REVISION_REGEX.captures(line) else {
            return Ok(None);
        };
        let Ok(changelist) = caps[2].parse::<u64>() else {
            tracing::warn!("Ignoring perforce changelist out of range: {}", &caps[2]);
            return Ok(None);
        };
        Ok(Some(PendingRevision {
            revision: caps[1].to_string(),
            changelist,
            entry: PendingEntry {
                date: Some(TIMESTAMP_FORMAT.parse(&caps[3])?),
                author: Some(caps[4].to_string()),
                ..Default::default()
            },
        }))
    }

    fn commit(&self, file: &str, pending: PendingRevision) -> Option<Commit> {
        let PendingRevision {
            revision,
            changelist,
            mut entry,
        } = pending;

        if let (Some(cutoff), Some(date)) = (self.cutoff, entry.date)
            && date < cutoff
        {
            return None;
        }

        entry.files.push(ChangeLogFile::with_revision(file, revision));
        entry
            .into_entry()
            .map(|entry| Commit::changelist(changelist, entry))
    }
}

impl LineMachine for PerforceLogParser {
    type State = PerforceState;

    fn policy(&self) -> DedupPolicy {
        DedupPolicy::Keyed
    }

    fn step(
        &self,
        state: PerforceState,
        line: &str,
    ) -> Result<(PerforceState, Option<Commit>), ScmError> {
        let PerforceState { mut file, phase } = state;

        let (phase, commit) = match phase {
            PerforcePhase::Revision => {
                if line.starts_with(FILE_BEGIN_TOKEN) {
                    file = line.get(self.prefix_len..).unwrap_or(line).to_string();
                    (PerforcePhase::Revision, None)
                } else if let Some(pending) = Self::parse_revision(line)? {
                    (PerforcePhase::CommentBegin(pending), None)
                } else {
                    (PerforcePhase::Revision, None)
                }
            }

            PerforcePhase::CommentBegin(pending) => (PerforcePhase::Comment(pending), None),

            PerforcePhase::Comment(mut pending) => {
                if line.is_empty() {
                    let commit = self.commit(&file, pending);
                    (PerforcePhase::Revision, commit)
                } else {
                    pending.entry.push_comment_line(line);
                    (PerforcePhase::Comment(pending), None)
                }
            }
        };

        Ok((PerforceState { file, phase }, commit))
    }

    fn finish(&self, state: PerforceState) -> Option<Commit> {
        match state.phase {
            PerforcePhase::CommentBegin(pending) | PerforcePhase::Comment(pending) => {
                self.commit(&state.file, pending)
            }
            PerforcePhase::Revision => None,
        }
    }
}

impl LogParser for PerforceLogParser {
    fn parse(&mut self, input: &mut dyn BufRead) -> Result<Vec<ChangeLogEntry>, ScmError> {
        let entries = fold_lines(&*self, input)?;
        tracing::debug!(entries = entries.len(), "Parsed perforce filelog");
        Ok(entries)
    }
}
