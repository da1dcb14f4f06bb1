//! Log generation: window selection, command construction and execution
//!
//! A [`LogGenerator`] is created per change-set window. [`LogGenerator::init`]
//! turns the window markers into absolute bounds and a backend restriction,
//! [`LogGenerator::entries`] runs the client and feeds its output to a parser.

pub(crate) mod clearcase;
pub(crate) mod cvs;
pub(crate) mod perforce;
pub(crate) mod starteam;
pub(crate) mod svn;
pub(crate) mod vss;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, TimeDelta};
use serde::Deserialize;

use super::{Backend, DateFormat, LogParser, ScmError, run_log_command};
use crate::model::ChangeLogEntry;

/// How window markers are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSelection {
    /// Markers are day counts looking back from now
    #[default]
    Range,
    /// Markers are absolute dates in the configured date format
    Date,
    /// Markers are tag names (CVS only)
    Tag,
}

impl fmt::Display for LogSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogSelection::Range => "range",
            LogSelection::Date => "date",
            LogSelection::Tag => "tag",
        })
    }
}

impl FromStr for LogSelection {
    type Err = ScmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "range" => Ok(LogSelection::Range),
            "date" => Ok(LogSelection::Date),
            "tag" => Ok(LogSelection::Tag),
            other => Err(ScmError::UnknownSelection {
                value: other.to_string(),
            }),
        }
    }
}

/// A fully resolved client invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment for the child
    pub env: Vec<(String, String)>,
}

impl LogCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program followed by its arguments
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// cmd.exe splits on `<` and `{`, so date ranges are quoted there
pub(crate) fn quote_for_platform(value: String) -> String {
    if cfg!(windows) {
        format!("\"{value}\"")
    } else {
        value
    }
}

/// Window bounds after [`LogGenerator::init`]
#[derive(Debug, Default, Clone)]
struct Window {
    restriction: Vec<String>,
    log_start: String,
    log_end: String,
    cutoff: Option<NaiveDateTime>,
}

/// Drives one backend client for one change-set window
#[derive(Debug)]
pub struct LogGenerator {
    backend: Backend,
    connection: String,
    base_dir: PathBuf,
    date_format: DateFormat,
    comment_format: Option<String>,
    window: Window,
}

impl LogGenerator {
    pub fn new(backend: Backend, connection: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            connection: connection.into(),
            base_dir: base_dir.into(),
            date_format: DateFormat::default(),
            comment_format: None,
            window: Window::default(),
        }
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    /// ClearCase comment layout override
    pub fn with_comment_format(mut self, comment_format: Option<String>) -> Self {
        self.comment_format = comment_format;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the window markers against the current local time
    pub fn init(
        &mut self,
        selection: LogSelection,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<(), ScmError> {
        self.init_at(selection, start, end, Local::now().naive_local())
    }

    /// Resolve the window markers against `now`
    pub fn init_at(
        &mut self,
        selection: LogSelection,
        start: Option<&str>,
        end: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<(), ScmError> {
        let start = start.map(str::trim).filter(|s| !s.is_empty());
        let end = end.map(str::trim).filter(|s| !s.is_empty());

        self.window = match selection {
            LogSelection::Tag => {
                let start = start.ok_or_else(|| ScmError::InvalidMarker {
                    marker: String::new(),
                    reason: "a tag window needs a start tag".to_string(),
                })?;
                Window {
                    restriction: self.backend.tag_argument(start, end)?,
                    log_start: start.to_string(),
                    log_end: end.unwrap_or_default().to_string(),
                    cutoff: None,
                }
            }
            LogSelection::Date => match start {
                None => {
                    return Err(ScmError::InvalidMarker {
                        marker: String::new(),
                        reason: "a date window needs a start date".to_string(),
                    });
                }
                Some(start) => {
                    let start = self.date_format.parse(start)?;
                    let end = match end {
                        Some(end) => self.date_format.parse(end)?,
                        None => days_before(now, -1, "")?,
                    };
                    self.bounded(start, end, None)
                }
            },
            LogSelection::Range => match start {
                None => Window::default(),
                Some(marker) => {
                    let start = days_before(now, parse_days(marker)?, marker)?;
                    let end = match end {
                        Some(marker) => days_before(now, parse_days(marker)?, marker)?,
                        None => days_before(now, -1, "")?,
                    };
                    self.bounded(start, end, Some(start))
                }
            },
        };

        tracing::debug!(
            selection = %selection,
            start = %self.window.log_start,
            end = %self.window.log_end,
            "Initialized log window"
        );
        Ok(())
    }

    fn bounded(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        cutoff: Option<NaiveDateTime>,
    ) -> Window {
        Window {
            restriction: self.backend.date_argument(&start, &end),
            log_start: self.date_format.format(&start),
            log_end: self.date_format.format(&end),
            cutoff,
        }
    }

    /// Start bound as written to the change set
    pub fn log_start(&self) -> &str {
        &self.window.log_start
    }

    /// End bound as written to the change set, empty for an open tag window
    pub fn log_end(&self) -> &str {
        &self.window.log_end
    }

    /// Oldest revision date worth keeping, for clients that cannot filter
    pub fn cutoff(&self) -> Option<NaiveDateTime> {
        self.window.cutoff
    }

    pub fn log_command(&self) -> Result<LogCommand, ScmError> {
        self.backend.build_log_command(
            &self.connection,
            &self.window.restriction,
            self.comment_format.as_deref(),
        )
    }

    /// Run the client in the working directory and parse its output
    pub fn entries(&self, parser: &mut dyn LogParser) -> Result<Vec<ChangeLogEntry>, ScmError> {
        if !self.base_dir.is_dir() {
            return Err(ScmError::WorkingDirectoryNotFound {
                path: self.base_dir.clone(),
            });
        }

        let command = self.log_command()?;
        match run_log_command(&command, &self.base_dir, self.backend, parser) {
            Err(ScmError::ExecutableNotFound { program })
                if self.backend.swallows_missing_executable() =>
            {
                tracing::warn!(
                    "Unable to find the {} client ({}), producing an empty change log",
                    self.backend,
                    program
                );
                Ok(Vec::new())
            }
            result => result,
        }
    }

    /// Release per-window resources
    pub fn cleanup(&mut self) -> Result<(), ScmError> {
        self.window = Window::default();
        Ok(())
    }
}

fn parse_days(marker: &str) -> Result<i64, ScmError> {
    marker
        .parse::<u32>()
        .map(i64::from)
        .map_err(|e| ScmError::InvalidMarker {
            marker: marker.to_string(),
            reason: format!("expected a number of days: {e}"),
        })
}

/// `now` minus `days`; negative values look forward
fn days_before(now: NaiveDateTime, days: i64, marker: &str) -> Result<NaiveDateTime, ScmError> {
    TimeDelta::try_days(days)
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| ScmError::InvalidMarker {
            marker: marker.to_string(),
            reason: "date out of range".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CVS_CONNECTION: &str = "scm:cvs:pserver:anoncvs@cvs.apache.org:/home/cvspublic:maven";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2004, 3, 15)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    fn generator(backend: Backend, connection: &str) -> LogGenerator {
        LogGenerator::new(backend, connection, ".")
    }

    #[test]
    fn test_range_window_cvs() {
        let mut generator = generator(Backend::Cvs, CVS_CONNECTION);
        generator
            .init_at(LogSelection::Range, Some("30"), None, now())
            .unwrap();

        let range = quote_for_platform("2004-02-14<2004-03-16".to_string());
        assert_eq!(
            generator.log_command().unwrap().command_line(),
            vec![
                "cvs".to_string(),
                "-d".to_string(),
                ":pserver:anoncvs@cvs.apache.org:/home/cvspublic".to_string(),
                "log".to_string(),
                "-d".to_string(),
                range,
            ]
        );
        assert_eq!(generator.log_start(), "2004-02-14");
        assert_eq!(generator.log_end(), "2004-03-16");
        assert_eq!(generator.cutoff(), Some(now() - TimeDelta::days(30)));
    }

    #[test]
    fn test_shorter_range_starts_later() {
        let mut ten = generator(Backend::Svn, "scm:svn:http://svn.example.org/repo");
        let mut thirty = generator(Backend::Svn, "scm:svn:http://svn.example.org/repo");
        ten.init_at(LogSelection::Range, Some("10"), None, now()).unwrap();
        thirty.init_at(LogSelection::Range, Some("30"), None, now()).unwrap();
        assert!(ten.cutoff() > thirty.cutoff());
    }

    #[test]
    fn test_range_with_end_marker() {
        let mut generator = generator(Backend::Vss, "scm:vss:/opt/vss::/MyProject");
        generator
            .init_at(LogSelection::Range, Some("30"), Some("10"), now())
            .unwrap();
        assert_eq!(generator.log_start(), "2004-02-14");
        assert_eq!(generator.log_end(), "2004-03-05");
        assert!(
            generator
                .log_command()
                .unwrap()
                .args
                .contains(&"-Vd05/03/2004~14/02/2004".to_string())
        );
    }

    #[test]
    fn test_range_without_marker_is_unrestricted() {
        let mut generator = generator(Backend::Svn, "scm:svn:http://svn.example.org/repo");
        generator.init_at(LogSelection::Range, None, None, now()).unwrap();
        assert_eq!(
            generator.log_command().unwrap().command_line(),
            vec!["svn", "log", "-v"]
        );
        assert_eq!(generator.log_start(), "");
        assert_eq!(generator.cutoff(), None);
    }

    #[test]
    fn test_range_rejects_bad_markers() {
        let mut generator = generator(Backend::Cvs, CVS_CONNECTION);
        for marker in ["-5", "thirty", "1.5"] {
            let err = generator
                .init_at(LogSelection::Range, Some(marker), None, now())
                .unwrap_err();
            assert!(matches!(err, ScmError::InvalidMarker { .. }), "{marker}");
        }
    }

    #[test]
    fn test_date_window_svn() {
        let mut generator = generator(Backend::Svn, "scm:svn:http://svn.example.org/repo");
        generator
            .init_at(LogSelection::Date, Some("2002-08-01"), Some("2002-08-31"), now())
            .unwrap();
        let expected = quote_for_platform("-r{2002-08-31}:{2002-08-01}".to_string());
        assert_eq!(generator.log_command().unwrap().args.last(), Some(&expected));
        assert_eq!(generator.log_start(), "2002-08-01");
        assert_eq!(generator.log_end(), "2002-08-31");
        assert_eq!(generator.cutoff(), None);
    }

    #[test]
    fn test_date_window_open_end_is_tomorrow() {
        let mut generator = generator(Backend::ClearCase, "scm:clearcase:view");
        generator
            .init_at(LogSelection::Date, Some("2004-03-01"), None, now())
            .unwrap();
        assert_eq!(generator.log_end(), "2004-03-16");
        let args = generator.log_command().unwrap().args;
        assert_eq!(&args[args.len() - 2..], ["-since", "01-Mar-2004"]);
    }

    #[test]
    fn test_date_window_custom_format() {
        let mut generator = generator(Backend::Cvs, CVS_CONNECTION)
            .with_date_format(DateFormat::new("dd.MM.yyyy").unwrap());
        generator
            .init_at(LogSelection::Date, Some("01.02.2004"), Some("15.02.2004"), now())
            .unwrap();
        assert_eq!(generator.log_start(), "01.02.2004");
        let expected = quote_for_platform("2004-02-01<2004-02-15".to_string());
        assert_eq!(generator.log_command().unwrap().args.last(), Some(&expected));
    }

    #[test]
    fn test_date_window_bad_date() {
        let mut generator = generator(Backend::Cvs, CVS_CONNECTION);
        let err = generator
            .init_at(LogSelection::Date, Some("last week"), None, now())
            .unwrap_err();
        assert!(matches!(err, ScmError::UnparseableDate { .. }));
    }

    #[test]
    fn test_date_window_requires_start() {
        let mut generator = generator(Backend::Svn, "scm:svn:http://svn.example.org/repo");
        let err = generator
            .init_at(LogSelection::Date, None, Some("2002-08-31"), now())
            .unwrap_err();
        assert!(matches!(err, ScmError::InvalidMarker { .. }));
    }

    #[test]
    fn test_tag_window() {
        let mut generator = generator(Backend::Cvs, CVS_CONNECTION);
        generator
            .init_at(LogSelection::Tag, Some("MAVEN_1_0"), None, now())
            .unwrap();
        assert_eq!(generator.log_start(), "MAVEN_1_0");
        assert_eq!(generator.log_end(), "");
        assert_eq!(
            generator.log_command().unwrap().args.last().map(String::as_str),
            Some("-rMAVEN_1_0::")
        );
    }

    #[test]
    fn test_tag_window_unsupported() {
        let mut generator = generator(Backend::Perforce, "scm:perforce://depot/...");
        let err = generator
            .init_at(LogSelection::Tag, Some("v1"), Some("v2"), now())
            .unwrap_err();
        assert!(matches!(err, ScmError::TagsUnsupported { backend: "perforce" }));
    }

    #[test]
    fn test_entries_missing_working_directory() {
        let mut parser = crate::scm::parser::SvnLogParser::new();
        let generator = LogGenerator::new(
            Backend::Svn,
            "scm:svn:http://svn.example.org/repo",
            "/definitely/not/a/dir",
        );
        let err = generator.entries(&mut parser).unwrap_err();
        assert!(matches!(err, ScmError::WorkingDirectoryNotFound { .. }));
    }

    #[test]
    fn test_selection_parsing() {
        assert_eq!("range".parse::<LogSelection>().unwrap(), LogSelection::Range);
        assert_eq!("tag".parse::<LogSelection>().unwrap(), LogSelection::Tag);
        assert!("week".parse::<LogSelection>().is_err());
        assert_eq!(LogSelection::Date.to_string(), "date");
    }
}
