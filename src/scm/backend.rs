//! Supported SCM backends
//!
//! A [`Backend`] knows its client executable, how to render date and tag
//! restrictions for it, how to build the full log command, and which parser
//! reads the output.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;

use super::ScmError;
use super::connection::{self, PerforceConnection, VssConnection};
use super::constants::{executables, noise, types};
use super::generator::{LogCommand, clearcase, cvs, perforce, starteam, svn, vss};
use super::parser::{
    ClearCaseLogParser, CvsLogParser, LogParser, PerforceLogParser, StarteamLogParser,
    SvnLogParser, VssLogParser,
};

/// A source-control system the change log can be generated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    Cvs,
    Svn,
    Perforce,
    ClearCase,
    Starteam,
    Vss,
}

/// Connection type token -> backend
static REGISTRY: LazyLock<BTreeMap<&'static str, Backend>> = LazyLock::new(|| {
    Backend::ALL
        .into_iter()
        .map(|backend| (backend.type_token(), backend))
        .collect()
});

impl Backend {
    pub const ALL: [Backend; 6] = [
        Backend::Cvs,
        Backend::Svn,
        Backend::Perforce,
        Backend::ClearCase,
        Backend::Starteam,
        Backend::Vss,
    ];

    /// Look a backend up by its connection type token
    pub fn from_type(token: &str) -> Option<Backend> {
        REGISTRY.get(token).copied()
    }

    /// All registered type tokens, sorted
    pub fn valid_types() -> Vec<&'static str> {
        REGISTRY.keys().copied().collect()
    }

    /// Infer the backend from a `scm:<type>:...` connection
    ///
    /// Malformed or unknown connections fall back to CVS with a warning.
    pub fn resolve(connection: &str) -> Backend {
        let Some(token) = connection::scm_type(connection) else {
            tracing::warn!(
                "Invalid SCM connection '{}', defaulting to {}",
                connection,
                types::CVS
            );
            return Backend::Cvs;
        };

        Backend::from_type(token).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown SCM type '{}', defaulting to {}. Valid types are: {}",
                token,
                types::CVS,
                Backend::valid_types().join(", ")
            );
            Backend::Cvs
        })
    }

    pub fn type_token(self) -> &'static str {
        match self {
            Backend::Cvs => types::CVS,
            Backend::Svn => types::SVN,
            Backend::Perforce => types::PERFORCE,
            Backend::ClearCase => types::CLEARCASE,
            Backend::Starteam => types::STARTEAM,
            Backend::Vss => types::VSS,
        }
    }

    /// Client binary name
    pub fn executable(self) -> &'static str {
        match self {
            Backend::Cvs => executables::CVS,
            Backend::Svn => executables::SVN,
            Backend::Perforce => executables::PERFORCE,
            Backend::ClearCase => executables::CLEARCASE,
            Backend::Starteam => executables::STARTEAM,
            Backend::Vss => executables::VSS,
        }
    }

    /// Whether a missing client yields an empty change log instead of an error
    pub fn swallows_missing_executable(self) -> bool {
        matches!(
            self,
            Backend::Cvs | Backend::Svn | Backend::Perforce | Backend::Starteam
        )
    }

    /// Whether a stderr line is worth reporting
    pub fn accepts_stderr_line(self, line: &str) -> bool {
        match self {
            Backend::Cvs => !line.starts_with(noise::CVS_SERVER_LOGGING),
            _ => true,
        }
    }

    /// Arguments restricting the log to `[start, end]`
    ///
    /// Empty for clients that cannot filter by date.
    pub fn date_argument(self, start: &NaiveDateTime, end: &NaiveDateTime) -> Vec<String> {
        match self {
            Backend::Cvs => cvs::date_argument(start, end),
            Backend::Svn => svn::date_argument(start, end),
            Backend::Perforce => perforce::date_argument(start, end),
            Backend::ClearCase => clearcase::date_argument(start, end),
            Backend::Starteam => starteam::date_argument(start, end),
            Backend::Vss => vss::date_argument(start, end),
        }
    }

    /// Arguments restricting the log to the revisions between two tags
    pub fn tag_argument(self, start: &str, end: Option<&str>) -> Result<Vec<String>, ScmError> {
        match self {
            Backend::Cvs => Ok(cvs::tag_argument(start, end)),
            _ => Err(ScmError::TagsUnsupported {
                backend: self.type_token(),
            }),
        }
    }

    /// Full log command for `connection`
    ///
    /// `restriction` is the output of [`Backend::date_argument`] or
    /// [`Backend::tag_argument`], or empty for an unbounded log.
    pub fn build_log_command(
        self,
        connection: &str,
        restriction: &[String],
        comment_format: Option<&str>,
    ) -> Result<LogCommand, ScmError> {
        connection::ensure_type(connection, self.type_token())?;
        match self {
            Backend::Cvs => cvs::log_command(connection, restriction),
            Backend::Svn => Ok(svn::log_command(restriction)),
            Backend::Perforce => perforce::log_command(connection),
            Backend::ClearCase => Ok(clearcase::log_command(restriction, comment_format)),
            Backend::Starteam => starteam::log_command(connection),
            Backend::Vss => vss::log_command(connection, restriction),
        }
    }

    /// Parser for this backend's log output
    ///
    /// `cutoff` drops older revisions for clients that cannot filter by date.
    pub fn create_parser(
        self,
        connection: &str,
        cutoff: Option<NaiveDateTime>,
    ) -> Result<Box<dyn LogParser>, ScmError> {
        let parser: Box<dyn LogParser> = match self {
            Backend::Cvs => Box::new(CvsLogParser::new()),
            Backend::Svn => Box::new(SvnLogParser::new()),
            Backend::Perforce => {
                let conn = PerforceConnection::parse(connection)?;
                Box::new(PerforceLogParser::new(conn.depot_prefix_len(), cutoff))
            }
            Backend::ClearCase => Box::new(ClearCaseLogParser::new()),
            Backend::Starteam => Box::new(StarteamLogParser::new()),
            Backend::Vss => Box::new(VssLogParser::new(VssConnection::parse(connection)?.project)),
        };
        Ok(parser)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_token())
    }
}

impl FromStr for Backend {
    type Err = ScmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::from_type(s).ok_or_else(|| {
            ScmError::invalid_connection(
                s,
                format!("unknown SCM type, valid types are: {}", Backend::valid_types().join(", ")),
            )
        })
    }
}
