//! `ss History`
//!
//! The database location is passed through `SSDIR` rather than an argument.

use chrono::NaiveDateTime;

use super::LogCommand;
use crate::scm::ScmError;
use crate::scm::connection::VssConnection;
use crate::scm::constants::executables;

const SSDIR: &str = "SSDIR";

/// `-Vd<end>~<start>`
pub(crate) fn date_argument(start: &NaiveDateTime, end: &NaiveDateTime) -> Vec<String> {
    vec![format!(
        "-Vd{}~{}",
        end.format("%d/%m/%Y"),
        start.format("%d/%m/%Y")
    )]
}

pub(crate) fn log_command(connection: &str, restriction: &[String]) -> Result<LogCommand, ScmError> {
    let conn = VssConnection::parse(connection)?;
    let mut cmd = LogCommand::new(executables::VSS)
        .arg("History")
        .arg(format!("${}", conn.project));
    if let Some(user_info) = conn.user_info {
        cmd = cmd.arg(format!("-Y{user_info}"));
    }
    Ok(cmd
        .arg("-R")
        .arg("-I-")
        .args(restriction.iter().cloned())
        .env(SSDIR, conn.ss_dir))
}
