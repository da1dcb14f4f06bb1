//! Visual SourceSafe log parser (ss History -R)
//!
//! Unlike the other clients, `ss` prints a loosely ordered block per item.
//! Lines are classified by prefix; only comment continuations depend on the
//! previous line's class. Every `*****` banner closes the current block, but
//! only the `*****  name  *****` form opens a new one, so project-level
//! version and label blocks never touch a committed entry.

use std::io::BufRead;
use std::sync::LazyLock;

use super::{Commit, DedupPolicy, LineMachine, LogParser, PendingEntry, fold_lines};
use crate::model::{ChangeLogEntry, ChangeLogFile};
use crate::scm::{DateFormat, ScmError};

const START_FILE: &str = "*****  ";
const START_BANNER: &str = "*****";
const START_REVISION: &str = "Version";
const START_AUTHOR: &str = "User: ";
const START_FILE_PATH: &str = "$/";
const START_COMMENT: &str = "Comment:";

static TIMESTAMP_FORMAT: LazyLock<DateFormat> = LazyLock::new(|| {
    DateFormat::new("dd.MM.yy HH:mm").expect("Invalid vss timestamp pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    File,
    Banner,
    Revision,
    Author,
    FilePath,
    Comment,
    Unknown,
}

/// The item block being read
#[derive(Debug, Default)]
pub(crate) struct VssBlock {
    entry: PendingEntry,
    file: ChangeLogFile,
    /// Set once the `$/` location line has qualified the file name
    located: bool,
}

#[derive(Debug)]
pub(crate) struct VssState {
    block: Option<VssBlock>,
    last: LineKind,
}

impl Default for VssState {
    fn default() -> Self {
        Self {
            block: None,
            last: LineKind::Unknown,
        }
    }
}

/// Parser for `ss History` output
#[derive(Debug, Default)]
pub struct VssLogParser {
    /// Project path from the connection, e.g. `/MyProject`
    project: String,
}

impl VssLogParser {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    fn classify(line: &str, last: LineKind) -> LineKind {
        if line.starts_with(START_FILE) {
            LineKind::File
        } else if line.starts_with(START_BANNER) {
            LineKind::Banner
        } else if line.starts_with(START_REVISION) {
            LineKind::Revision
        } else if line.starts_with(START_AUTHOR) {
            LineKind::Author
        } else if line.contains(START_FILE_PATH) {
            LineKind::FilePath
        } else if line.starts_with(START_COMMENT) || last == LineKind::Comment {
            LineKind::Comment
        } else {
            LineKind::Unknown
        }
    }

    /// `$/MyProject/src` + `lib.c` -> `/src/lib.c`
    fn qualified_name(&self, line: &str, file_name: &str) -> String {
        let path = line.find('$').map_or("", |i| &line[i..]);
        let below_project = path.get(self.project.len() + 1..).unwrap_or_default();
        format!("{below_project}/{file_name}")
    }

    fn commit(block: VssBlock) -> Option<Commit> {
        if !block.located {
            return None;
        }
        let VssBlock {
            mut entry, file, ..
        } = block;
        entry.files.push(file);
        entry.into_entry().map(Commit::composite)
    }
}

impl LineMachine for VssLogParser {
    type State = VssState;

    fn policy(&self) -> DedupPolicy {
        DedupPolicy::Keyed
    }

    fn step(&self, state: VssState, line: &str) -> Result<(VssState, Option<Commit>), ScmError> {
        let VssState { mut block, last } = state;
        let kind = Self::classify(line, last);
        let mut commit = None;

        match kind {
            LineKind::File => {
                // *****  lib.c  *****
                let name = line.split(' ').nth(2).unwrap_or_default();
                commit = block.take().and_then(Self::commit);
                block = Some(VssBlock {
                    file: ChangeLogFile::new(name),
                    ..Default::default()
                });
            }
            LineKind::Banner => {
                commit = block.take().and_then(Self::commit);
            }
            LineKind::Revision => {
                if let Some(block) = block.as_mut() {
                    block.file.revision = line.split(' ').nth(1).unwrap_or_default().to_string();
                }
            }
            LineKind::Author => {
                // User: Bob          Date: 24.03.04   Time:  9:05
                if let Some(block) = block.as_mut() {
                    let tokens: Vec<&str> = line.split_whitespace().collect();
                    block.entry.author = tokens.get(1).map(|a| a.to_string());
                    if let (Some(date), Some(time)) = (tokens.get(3), tokens.get(5)) {
                        block.entry.date = Some(TIMESTAMP_FORMAT.parse(&format!("{date} {time}"))?);
                    }
                }
            }
            LineKind::FilePath => {
                if let Some(block) = block.as_mut()
                    && !block.located
                {
                    block.file.name = self.qualified_name(line, &block.file.name);
                    block.located = true;
                }
            }
            LineKind::Comment => {
                // Whitespace around comment lines is layout, not content
                if let Some(block) = block.as_mut() {
                    match line.strip_prefix(START_COMMENT) {
                        Some(comment) => block.entry.comment = comment.trim().to_string(),
                        None if line.trim().is_empty() => {}
                        None => {
                            block.entry.comment.push(' ');
                            block.entry.comment.push_str(line.trim());
                        }
                    }
                }
            }
            LineKind::Unknown => {}
        }

        Ok((VssState { block, last: kind }, commit))
    }

    fn finish(&self, state: VssState) -> Option<Commit> {
        state.block.and_then(Self::commit)
    }
}

impl LogParser for VssLogParser {
    fn parse(&mut self, input: &mut dyn BufRead) -> Result<Vec<ChangeLogEntry>, ScmError> {
        let entries = fold_lines(&*self, input)?;
        tracing::debug!(entries = entries.len(), "Parsed vss history");
        Ok(entries)
    }
}
