//! SCM client layer
//!
//! This module knows how to invoke each supported source-control client and
//! how to turn its log output into [`ChangeLogEntry`](crate::model::ChangeLogEntry)
//! values.

mod backend;
pub mod connection;
pub mod constants;
mod date_format;
mod executor;
pub mod generator;
/// Parser module (public for integration testing)
pub mod parser;

pub use backend::Backend;
pub use date_format::DateFormat;
pub use executor::run_log_command;
pub use generator::{LogCommand, LogGenerator, LogSelection};
pub use parser::LogParser;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while querying an SCM
#[derive(Error, Debug)]
pub enum ScmError {
    #[error("Invalid repository connection '{connection}': {reason}")]
    InvalidConnection { connection: String, reason: String },

    #[error("Repository connection '{connection}' does not specify '{expected}' as the scm")]
    ConnectionMismatch {
        connection: String,
        expected: &'static str,
    },

    #[error("Tag based change logs are not supported by {backend}")]
    TagsUnsupported { backend: &'static str },

    #[error("SCM working directory not found: {}", path.display())]
    WorkingDirectoryNotFound { path: PathBuf },

    #[error("{program} is not installed or not in PATH")]
    ExecutableNotFound { program: String },

    #[error("Unparseable date: '{value}'")]
    UnparseableDate { value: String },

    #[error("Invalid marker '{marker}': {reason}")]
    InvalidMarker { marker: String, reason: String },

    #[error("Unknown log selection '{value}', expected one of: range, date, tag")]
    UnknownSelection { value: String },

    #[error("Invalid date format '{pattern}': {reason}")]
    InvalidDateFormat { pattern: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl ScmError {
    pub(crate) fn invalid_connection(connection: &str, reason: impl Into<String>) -> Self {
        ScmError::InvalidConnection {
            connection: connection.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unparseable_date(value: &str) -> Self {
        ScmError::UnparseableDate {
            value: value.to_string(),
        }
    }
}
