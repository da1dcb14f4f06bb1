//! `p4 [-p <port>] filelog -tl <filespec>`
//!
//! `filelog` cannot filter by date; the parser applies a cutoff instead.

use chrono::NaiveDateTime;

use super::LogCommand;
use crate::scm::ScmError;
use crate::scm::connection::PerforceConnection;
use crate::scm::constants::executables;

pub(crate) fn date_argument(_start: &NaiveDateTime, _end: &NaiveDateTime) -> Vec<String> {
    Vec::new()
}

pub(crate) fn log_command(connection: &str) -> Result<LogCommand, ScmError> {
    let conn = PerforceConnection::parse(connection)?;
    let mut cmd = LogCommand::new(executables::PERFORCE);
    if let Some(port) = conn.port {
        cmd = cmd.arg("-p").arg(port);
    }
    Ok(cmd.arg("filelog").arg("-tl").arg(conn.filespec))
}
