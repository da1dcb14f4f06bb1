//! Change log configuration, loadable from `scm-changelog.toml`

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ChangeLogError;
use crate::scm::{DateFormat, LogSelection, ScmError};

pub const CONFIG_FILE_NAME: &str = "scm-changelog.toml";

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_encoding() -> String {
    "UTF-8".to_string()
}

/// Everything a change log run needs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChangeLogConfig {
    /// `scm:<type>:...` repository connection
    pub connection: String,

    /// Backend type token overriding the one inferred from `connection`
    pub backend: Option<String>,

    /// Working directory the SCM client runs in
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// How the markers below are interpreted
    #[serde(rename = "type")]
    pub selection: LogSelection,

    /// Comma-delimited day counts
    pub range: Option<String>,

    /// Comma-delimited dates in `date_format`
    pub date: Option<String>,

    /// Comma-delimited tags
    pub tag: Option<String>,

    /// Java-style date pattern for date markers and the XML `<date>`
    pub date_format: Option<String>,

    /// ClearCase `lshistory` comment layout
    pub comment_format: Option<String>,

    /// Where the XML document is written
    pub output: Option<PathBuf>,

    /// Encoding named in the XML declaration
    #[serde(default = "default_output_encoding")]
    pub output_encoding: String,
}

impl Default for ChangeLogConfig {
    fn default() -> Self {
        Self {
            connection: String::new(),
            backend: None,
            base_dir: default_base_dir(),
            selection: LogSelection::default(),
            range: None,
            date: None,
            tag: None,
            date_format: None,
            comment_format: None,
            output: None,
            output_encoding: default_output_encoding(),
        }
    }
}

impl ChangeLogConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChangeLogError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ChangeLogError::FileReadError {
                path: path.to_path_buf(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| ChangeLogError::TomlParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Look for `scm-changelog.toml` in `dir`
    pub fn find_config_file<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        let config_path = dir.as_ref().join(CONFIG_FILE_NAME);
        config_path.is_file().then_some(config_path)
    }

    /// Markers for the selected log type
    pub fn markers(&self) -> Option<&str> {
        match self.selection {
            LogSelection::Range => self.range.as_deref(),
            LogSelection::Date => self.date.as_deref(),
            LogSelection::Tag => self.tag.as_deref(),
        }
    }

    pub fn date_format(&self) -> Result<DateFormat, ScmError> {
        self.date_format
            .as_deref()
            .map_or_else(|| Ok(DateFormat::default()), DateFormat::new)
    }
}
