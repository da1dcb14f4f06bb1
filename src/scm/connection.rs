//! Repository connection strings
//!
//! Connections look like `scm<d><type><d><type-specific tokens>`, where `<d>`
//! is the character at index 3 (`:` or `|`).

use super::ScmError;
use super::constants::{SCM_PREFIX, types};

const POS_SCM_TYPE: usize = 1;
const POS_SCM_SUBTYPE: usize = 2;
const POS_SCM_USERHOST: usize = 3;
const POS_SCM_PATH: usize = 4;
const CVS_TOKEN_COUNT: usize = 6;

/// Split a connection into its tokens
///
/// Empty tokens are kept. CVS connections are normalized to six tokens:
/// a five-token `local` connection gets an empty user/host token inserted.
pub fn split_scm_connection(connection: &str) -> Result<Vec<String>, ScmError> {
    if connection.len() < 4 {
        return Err(ScmError::invalid_connection(connection, "connection is too short"));
    }
    if !connection.starts_with(SCM_PREFIX) {
        return Err(ScmError::invalid_connection(
            connection,
            "connection must start with scm[delim]",
        ));
    }

    let delimiter = connection[3..]
        .chars()
        .next()
        .filter(|c| *c == ':' || *c == '|')
        .ok_or_else(|| ScmError::invalid_connection(connection, "delimiter must be ':' or '|'"))?;

    let mut tokens: Vec<String> = connection.split(delimiter).map(str::to_string).collect();

    if tokens.get(POS_SCM_TYPE).map(String::as_str) == Some(types::CVS) {
        if tokens.get(POS_SCM_SUBTYPE).map(String::as_str) == Some("local") {
            match tokens.len() {
                6 => {
                    let userhost = &tokens[POS_SCM_USERHOST];
                    if !userhost.is_empty() && userhost != "local" {
                        return Err(ScmError::invalid_connection(
                            connection,
                            "cvs local connection must have 5 tokens, or an empty 3rd token if 6",
                        ));
                    }
                }
                5 => tokens.insert(POS_SCM_USERHOST, String::new()),
                _ => {
                    return Err(ScmError::invalid_connection(
                        connection,
                        "cvs local connection doesn't contain five tokens",
                    ));
                }
            }
        }
        if tokens.len() != CVS_TOKEN_COUNT {
            return Err(ScmError::invalid_connection(
                connection,
                "cvs connection doesn't contain six tokens",
            ));
        }
    }

    Ok(tokens)
}

/// The `<type>` token of a `scm:<type>:...` connection
///
/// Returns `None` when the connection is too short or malformed.
pub fn scm_type(connection: &str) -> Option<&str> {
    let rest = connection.strip_prefix("scm:")?;
    if connection.len() < 7 {
        return None;
    }
    let (scm_type, _) = rest.split_once(':')?;
    (!scm_type.is_empty()).then_some(scm_type)
}

/// Fail unless `connection` names `expected` as its SCM type
pub fn ensure_type(connection: &str, expected: &'static str) -> Result<(), ScmError> {
    let matches = connection
        .get(3..)
        .and_then(|rest| {
            let delimiter = rest.chars().next()?;
            rest[delimiter.len_utf8()..]
                .split(delimiter)
                .next()
                .map(|t| t == expected)
        })
        .unwrap_or(false);

    if connection.starts_with(SCM_PREFIX) && matches {
        Ok(())
    } else {
        Err(ScmError::ConnectionMismatch {
            connection: connection.to_string(),
            expected,
        })
    }
}

/// CVSROOT value for a (normalized, six-token) CVS connection
pub fn cvs_root(connection: &str) -> Result<String, ScmError> {
    let tokens = split_scm_connection(connection)?;
    if tokens[POS_SCM_TYPE] != types::CVS {
        return Err(ScmError::ConnectionMismatch {
            connection: connection.to_string(),
            expected: types::CVS,
        });
    }

    let subtype = &tokens[POS_SCM_SUBTYPE];
    let userhost = &tokens[POS_SCM_USERHOST];
    let path = &tokens[POS_SCM_PATH];

    let root = if subtype.eq_ignore_ascii_case("local") {
        path.clone()
    } else if subtype.eq_ignore_ascii_case("lserver") {
        format!("{userhost}:{path}")
    } else {
        format!(":{subtype}:{userhost}:{path}")
    };
    Ok(root)
}

/// Perforce server address and depot filespec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerforceConnection {
    /// `host:port`, absent when the connection names only a filespec
    pub port: Option<String>,
    /// Depot path pattern, e.g. `//depot/projects/name/...`
    pub filespec: String,
}

impl PerforceConnection {
    const PREFIX: &'static str = "scm:perforce:";

    pub fn parse(connection: &str) -> Result<Self, ScmError> {
        if !connection.starts_with(Self::PREFIX) {
            return Err(ScmError::ConnectionMismatch {
                connection: connection.to_string(),
                expected: types::PERFORCE,
            });
        }

        let last_colon = connection
            .rfind(':')
            .ok_or_else(|| ScmError::invalid_connection(connection, "missing filespec"))?;
        let filespec = connection[last_colon + 1..].to_string();
        if filespec.is_empty() {
            return Err(ScmError::invalid_connection(connection, "missing filespec"));
        }

        let port = (last_colon >= Self::PREFIX.len())
            .then(|| connection[Self::PREFIX.len()..last_colon].to_string())
            .filter(|p| !p.is_empty());

        Ok(Self { port, filespec })
    }

    /// Length of the directory prefix stripped from depot paths in `filelog`
    pub fn depot_prefix_len(&self) -> usize {
        self.filespec.rfind('/').map_or(0, |i| i + 1)
    }
}

/// Visual SourceSafe database, credentials and project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VssConnection {
    /// Directory holding `srcsafe.ini`, exported as `SSDIR`
    pub ss_dir: String,
    /// `user,password` for `-Y`, absent when empty
    pub user_info: Option<String>,
    /// Project path below `$`, e.g. `/MyProject`
    pub project: String,
}

impl VssConnection {
    const PREFIX: &'static str = "scm:vss:";

    pub fn parse(connection: &str) -> Result<Self, ScmError> {
        let rest = connection
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| ScmError::ConnectionMismatch {
                connection: connection.to_string(),
                expected: types::VSS,
            })?;

        let mut parts = rest.split(':');
        let (Some(ss_dir), Some(user_info), Some(project)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ScmError::invalid_connection(
                connection,
                "expected scm:vss:<ssdir>:<user,password>:<project>",
            ));
        };

        Ok(Self {
            ss_dir: ss_dir.to_string(),
            user_info: (!user_info.is_empty()).then(|| user_info.to_string()),
            project: project.to_string(),
        })
    }
}

/// StarTeam project URL following `scm:starteam:`
pub fn starteam_url(connection: &str) -> Result<&str, ScmError> {
    connection
        .strip_prefix("scm:starteam:")
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ScmError::ConnectionMismatch {
            connection: connection.to_string(),
            expected: types::STARTEAM,
        })
}
