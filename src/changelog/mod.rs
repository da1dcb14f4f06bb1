//! Change log orchestration
//!
//! [`ChangeLog`] splits the configured markers into windows, runs one
//! generator/parser pair per window and collects the resulting
//! [`ChangeLogSet`]s. The sets can be written to, and read back from, an XML
//! document (see [`xml`]).

mod config;
pub mod xml;

pub use config::{CONFIG_FILE_NAME, ChangeLogConfig};

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;

use crate::model::ChangeLogSet;
use crate::scm::{Backend, DateFormat, LogGenerator, LogParser, ScmError};

/// Errors that can occur while producing a change log
#[derive(Error, Debug)]
pub enum ChangeLogError {
    #[error(transparent)]
    Scm(#[from] ScmError),

    #[error("Failed to read {}: {source}", path.display())]
    FileReadError { path: PathBuf, source: io::Error },

    #[error("Failed to parse {}: {source}", path.display())]
    TomlParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("No repository connection configured")]
    MissingConnection,

    #[error("Invalid change log document: {0}")]
    XmlError(#[from] quick_xml::DeError),

    #[error("Invalid time in change log document: '{value}'")]
    InvalidXmlTime { value: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// One change-set window: a start marker and an optional end marker
pub type Window = (Option<String>, Option<String>);

/// Split a comma-delimited marker list into successive windows
///
/// N markers give N-1 windows, one marker gives an open-ended window and no
/// marker gives a single unbounded window.
pub fn windows(markers: Option<&str>) -> Vec<Window> {
    let markers: Vec<String> = markers
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    match markers.as_slice() {
        [] => vec![(None, None)],
        [only] => vec![(Some(only.clone()), None)],
        _ => markers
            .windows(2)
            .map(|pair| (Some(pair[0].clone()), Some(pair[1].clone())))
            .collect(),
    }
}

/// Drives change log generation for one configuration
#[derive(Debug, Clone)]
pub struct ChangeLog {
    config: ChangeLogConfig,
}

impl ChangeLog {
    pub fn new(config: ChangeLogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChangeLogConfig {
        &self.config
    }

    /// Backend from the explicit override, otherwise inferred from the connection
    pub fn backend(&self) -> Result<Backend, ChangeLogError> {
        match self.config.backend.as_deref() {
            Some(token) => Ok(token.parse()?),
            None => Ok(Backend::resolve(&self.config.connection)),
        }
    }

    /// Generate one change set per window
    pub fn generate_sets(&self) -> Result<Vec<ChangeLogSet>, ChangeLogError> {
        self.generate_sets_at(Local::now().naive_local())
    }

    /// Generate one change set per window, with range markers relative to `now`
    pub fn generate_sets_at(&self, now: NaiveDateTime) -> Result<Vec<ChangeLogSet>, ChangeLogError> {
        let span = tracing::info_span!(
            "changelog",
            connection = %self.config.connection,
            selection = %self.config.selection
        );
        let _enter = span.enter();

        if self.config.connection.is_empty() {
            return Err(ChangeLogError::MissingConnection);
        }
        let backend = self.backend()?;
        let date_format = self.config.date_format()?;

        windows(self.config.markers())
            .iter()
            .map(|(start, end)| {
                self.generate_window(backend, &date_format, start.as_deref(), end.as_deref(), now)
                    .inspect_err(|e| {
                        tracing::warn!(
                            "Failed to generate change set starting at '{}': {}",
                            start.as_deref().unwrap_or_default(),
                            e
                        );
                    })
            })
            .collect()
    }

    #[tracing::instrument(
        name = "window",
        skip_all,
        fields(start = start.unwrap_or_default(), end = end.unwrap_or_default())
    )]
    fn generate_window(
        &self,
        backend: Backend,
        date_format: &DateFormat,
        start: Option<&str>,
        end: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<ChangeLogSet, ChangeLogError> {
        let generator = self.generator(backend, date_format);

        // Both halves are cleaned up however the window ends
        let mut pair = scopeguard::guard(
            (generator, None::<Box<dyn LogParser>>),
            |(mut generator, parser)| {
                if let Some(mut parser) = parser
                    && let Err(e) = parser.cleanup()
                {
                    tracing::warn!("Parser cleanup failed: {}", e);
                }
                if let Err(e) = generator.cleanup() {
                    tracing::warn!("Generator cleanup failed: {}", e);
                }
            },
        );
        let (generator, parser) = &mut *pair;

        generator.init_at(self.config.selection, start, end, now)?;
        let parser = parser.insert(self.parser(backend, generator.cutoff())?);
        let entries = generator.entries(&mut **parser)?;

        let set = ChangeLogSet::new(
            entries,
            generator.log_start(),
            Some(generator.log_end().to_string()),
        );
        tracing::info!(
            "ChangeSet between {} and {}: {} entries",
            set.start(),
            set.end_display(),
            set.len()
        );
        Ok(set)
    }

    fn generator(&self, backend: Backend, date_format: &DateFormat) -> LogGenerator {
        LogGenerator::new(backend, self.config.connection.as_str(), self.config.base_dir.as_path())
            .with_date_format(date_format.clone())
            .with_comment_format(self.config.comment_format.clone())
    }

    /// Parser for `backend`; an explicitly configured date format also
    /// describes the dates inside the client output
    fn parser(
        &self,
        backend: Backend,
        cutoff: Option<NaiveDateTime>,
    ) -> Result<Box<dyn LogParser>, ScmError> {
        let mut parser = backend.create_parser(&self.config.connection, cutoff)?;
        if let Some(pattern) = self.config.date_format.as_deref() {
            parser.set_date_format_in_file(pattern)?;
        }
        Ok(parser)
    }

    /// Parse a captured client log instead of running the client
    ///
    /// The first window's markers still bound the resulting change set.
    pub fn replay(&self, log: &Path) -> Result<ChangeLogSet, ChangeLogError> {
        self.replay_at(log, Local::now().naive_local())
    }

    pub fn replay_at(&self, log: &Path, now: NaiveDateTime) -> Result<ChangeLogSet, ChangeLogError> {
        let backend = self.backend()?;
        let date_format = self.config.date_format()?;
        let (start, end) = windows(self.config.markers())
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut generator = self.generator(backend, &date_format);
        generator.init_at(self.config.selection, start.as_deref(), end.as_deref(), now)?;
        let mut parser = self.parser(backend, generator.cutoff())?;

        let file = File::open(log).map_err(|e| ChangeLogError::FileReadError {
            path: log.to_path_buf(),
            source: e,
        })?;
        let entries = parser.parse(&mut BufReader::new(file))?;
        tracing::info!("Replayed {} entries from {}", entries.len(), log.display());

        let set = ChangeLogSet::new(
            entries,
            generator.log_start(),
            Some(generator.log_end().to_string()),
        );
        parser.cleanup()?;
        generator.cleanup()?;
        Ok(set)
    }

    /// Load the configured output document when asked to, otherwise generate
    pub fn load_or_generate(&self, reuse_existing: bool) -> Result<Vec<ChangeLogSet>, ChangeLogError> {
        if reuse_existing
            && let Some(output) = self.config.output.as_deref()
            && output.is_file()
        {
            tracing::info!("Reusing existing change log {}", output.display());
            return xml::read_xml(output, &self.config.date_format()?);
        }
        self.generate_sets()
    }

    /// Write `sets` to the configured output, if any
    pub fn write(&self, sets: &[ChangeLogSet]) -> Result<Option<PathBuf>, ChangeLogError> {
        let Some(output) = self.config.output.as_deref() else {
            return Ok(None);
        };
        xml::write_xml(
            output,
            sets,
            &self.config.date_format()?,
            &self.config.output_encoding,
        )?;
        Ok(Some(output.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scm::LogSelection;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    #[test]
    fn test_windows_from_markers() {
        assert_eq!(windows(None), vec![(None, None)]);
        assert_eq!(windows(Some(" , ")), vec![(None, None)]);
        assert_eq!(windows(Some("30")), vec![(Some("30".to_string()), None)]);
        assert_eq!(
            windows(Some("v1,,v2, v3")),
            vec![
                (Some("v1".to_string()), Some("v2".to_string())),
                (Some("v2".to_string()), Some("v3".to_string())),
            ]
        );
    }

    #[test]
    fn test_backend_override() {
        let mut config = ChangeLogConfig {
            connection: "scm:svn:http://svn.example.org/repo".to_string(),
            ..Default::default()
        };
        assert_eq!(ChangeLog::new(config.clone()).backend().unwrap(), Backend::Svn);

        config.backend = Some("perforce".to_string());
        assert_eq!(ChangeLog::new(config.clone()).backend().unwrap(), Backend::Perforce);

        config.backend = Some("git".to_string());
        assert!(ChangeLog::new(config).backend().is_err());
    }

    #[test]
    fn test_missing_connection() {
        let err = ChangeLog::new(ChangeLogConfig::default())
            .generate_sets()
            .unwrap_err();
        assert!(matches!(err, ChangeLogError::MissingConnection));
    }

    #[test]
    fn test_missing_working_directory_fails() {
        let config = ChangeLogConfig {
            connection: "scm:svn:http://svn.example.org/repo".to_string(),
            base_dir: PathBuf::from("/definitely/not/a/dir"),
            range: Some("30".to_string()),
            ..Default::default()
        };
        let err = ChangeLog::new(config).generate_sets().unwrap_err();
        assert!(matches!(
            err,
            ChangeLogError::Scm(ScmError::WorkingDirectoryNotFound { .. })
        ));
    }

    #[traced_test]
    #[test]
    fn test_failed_window_is_logged() {
        let config = ChangeLogConfig {
            connection: "scm:svn:http://svn.example.org/repo".to_string(),
            selection: LogSelection::Tag,
            tag: Some("v1,v2".to_string()),
            ..Default::default()
        };
        let err = ChangeLog::new(config).generate_sets().unwrap_err();
        assert!(matches!(
            err,
            ChangeLogError::Scm(ScmError::TagsUnsupported { backend: "svn" })
        ));
        assert!(logs_contain("Failed to generate change set starting at 'v1'"));
    }

    #[test]
    fn test_write_without_output_is_noop() {
        let changelog = ChangeLog::new(ChangeLogConfig::default());
        assert_eq!(changelog.write(&[]).unwrap(), None);
    }

    #[test]
    fn test_reuse_existing_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("changelog.xml");
        std::fs::write(
            &output,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n\
             <changelog>\n<changeset start=\"2004-01-01\">\n</changeset>\n</changelog>\n",
        )
        .unwrap();

        let config = ChangeLogConfig {
            connection: "scm:svn:http://svn.example.org/repo".to_string(),
            base_dir: PathBuf::from("/definitely/not/a/dir"),
            output: Some(output),
            ..Default::default()
        };
        let changelog = ChangeLog::new(config);
        let sets = changelog.load_or_generate(true).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].start(), "2004-01-01");
        assert!(changelog.load_or_generate(false).is_err());
    }
}
