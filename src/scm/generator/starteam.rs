//! `stcmd hist`

use chrono::NaiveDateTime;

use super::LogCommand;
use crate::scm::ScmError;
use crate::scm::connection;
use crate::scm::constants::executables;

pub(crate) fn date_argument(_start: &NaiveDateTime, _end: &NaiveDateTime) -> Vec<String> {
    Vec::new()
}

pub(crate) fn log_command(connection: &str) -> Result<LogCommand, ScmError> {
    let url = connection::starteam_url(connection)?;
    Ok(LogCommand::new(executables::STARTEAM)
        .args(["hist", "-x", "-nologo", "-is", "-p"])
        .arg(url))
}
