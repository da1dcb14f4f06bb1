//! StarTeam log parser (stcmd hist)
//!
//! ```text
//! Folder: Maven  (working dir: /home/build/maven)
//! History for: project.xml
//! Description: Maven project descriptor
//! ----------------------------
//! Revision: 3 View: Maven Branch Revision: 1.2
//! Author: Emmanuel Venisse Date: 07/04/03 09:17:31 CEST
//! Fix dependency list
//! ===================================================================
//! ```

use std::io::BufRead;
use std::sync::LazyLock;

use super::{Commit, DedupPolicy, LineMachine, LogParser, PendingEntry, fold_lines};
use crate::model::{ChangeLogEntry, ChangeLogFile};
use crate::scm::constants::markers::{REVISION_SEPARATOR, STARTEAM_FILE_END};
use crate::scm::{DateFormat, ScmError};

const START_FOLDER: &str = "Folder: ";
const WORKING_DIR: &str = "(working dir";
const START_FILE: &str = "History for: ";
const REVISION_TAG: &str = "Revision: ";
const AUTHOR_TAG: &str = "Author: ";
const DATE_TAG: &str = " Date: ";

/// `stcmd` prints dates in the client's locale; this is the common default
static DEFAULT_DATE_FORMAT: LazyLock<DateFormat> = LazyLock::new(|| {
    DateFormat::new("dd/MM/yy HH:mm:ss").expect("Invalid starteam timestamp pattern")
});

#[derive(Debug, Default)]
pub(crate) enum StarteamPhase {
    /// Waiting for `History for:`
    #[default]
    File,
    /// Waiting for `Revision:` (or the file terminator)
    Revision { file: ChangeLogFile },
    /// Waiting for `Author: ... Date: ...`
    Author { entry: PendingEntry },
    /// Collecting the check-in comment
    Comment { entry: PendingEntry },
}

#[derive(Debug, Default)]
pub(crate) struct StarteamState {
    folder: String,
    phase: StarteamPhase,
}

/// Parser for `stcmd hist` output
#[derive(Debug)]
pub struct StarteamLogParser {
    date_format: DateFormat,
}

impl Default for StarteamLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StarteamLogParser {
    pub fn new() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.clone(),
        }
    }

    fn qualify(folder: &str, name: &str) -> String {
        if folder.is_empty() {
            name.to_string()
        } else {
            format!("{folder}/{name}")
        }
    }

    /// File of an entry, with an empty revision for the next one
    fn next_file(entry: &PendingEntry) -> ChangeLogFile {
        entry
            .files
            .first()
            .map(|f| ChangeLogFile::new(f.name.as_str()))
            .unwrap_or_default()
    }
}

impl LineMachine for StarteamLogParser {
    type State = StarteamState;

    fn policy(&self) -> DedupPolicy {
        DedupPolicy::Keyed
    }

    fn step(
        &self,
        state: StarteamState,
        line: &str,
    ) -> Result<(StarteamState, Option<Commit>), ScmError> {
        let StarteamState { mut folder, phase } = state;

        if let Some(rest) = line.strip_prefix(START_FOLDER) {
            folder = rest
                .split(WORKING_DIR)
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            let commit = match phase {
                StarteamPhase::Comment { entry } => entry.into_entry().map(Commit::composite),
                _ => None,
            };
            let state = StarteamState {
                folder,
                phase: StarteamPhase::File,
            };
            return Ok((state, commit));
        }

        let (phase, commit) = match phase {
            StarteamPhase::File => match line.strip_prefix(START_FILE) {
                Some(name) => {
                    let file = ChangeLogFile::new(Self::qualify(&folder, name.trim()));
                    (StarteamPhase::Revision { file }, None)
                }
                None => (StarteamPhase::File, None),
            },

            StarteamPhase::Revision { mut file } => {
                if let Some(rest) = line.strip_prefix(REVISION_TAG) {
                    file.revision = rest.split_whitespace().next().unwrap_or_default().to_string();
                    let entry = PendingEntry::with_file(file);
                    (StarteamPhase::Author { entry }, None)
                } else if line.starts_with(STARTEAM_FILE_END) {
                    (StarteamPhase::File, None)
                } else {
                    (StarteamPhase::Revision { file }, None)
                }
            }

            StarteamPhase::Author { mut entry } => match line.strip_prefix(AUTHOR_TAG) {
                Some(rest) => {
                    let (author, stamp) = rest.split_once(DATE_TAG).unwrap_or((rest, ""));
                    entry.author = Some(author.trim().to_string());
                    let (date, _) = self.date_format.parse_prefix(stamp)?;
                    entry.date = Some(date);
                    (StarteamPhase::Comment { entry }, None)
                }
                None => (StarteamPhase::Author { entry }, None),
            },

            StarteamPhase::Comment { mut entry } => {
                if line.starts_with(REVISION_SEPARATOR) {
                    let file = Self::next_file(&entry);
                    let commit = entry.into_entry().map(Commit::composite);
                    (StarteamPhase::Revision { file }, commit)
                } else if line.starts_with(STARTEAM_FILE_END) {
                    (StarteamPhase::File, entry.into_entry().map(Commit::composite))
                } else {
                    entry.push_comment_line(line);
                    (StarteamPhase::Comment { entry }, None)
                }
            }
        };

        Ok((StarteamState { folder, phase }, commit))
    }

    fn finish(&self, state: StarteamState) -> Option<Commit> {
        match state.phase {
            StarteamPhase::Comment { entry } => entry.into_entry().map(Commit::composite),
            _ => None,
        }
    }
}

impl LogParser for StarteamLogParser {
    fn set_date_format_in_file(&mut self, pattern: &str) -> Result<(), ScmError> {
        self.date_format = DateFormat::new(pattern)?;
        Ok(())
    }

    fn parse(&mut self, input: &mut dyn BufRead) -> Result<Vec<ChangeLogEntry>, ScmError> {
        let entries = fold_lines(&*self, input)?;
        tracing::debug!(entries = entries.len(), "Parsed starteam history");
        Ok(entries)
    }
}
