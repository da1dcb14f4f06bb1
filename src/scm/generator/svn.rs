//! `svn log -v`

use chrono::NaiveDateTime;

use super::{LogCommand, quote_for_platform};
use crate::scm::constants::executables;

/// Newest revision first: `-r{end}:{start}`
pub(crate) fn date_argument(start: &NaiveDateTime, end: &NaiveDateTime) -> Vec<String> {
    let range = format!(
        "-r{{{}}}:{{{}}}",
        end.format("%Y-%m-%d"),
        start.format("%Y-%m-%d")
    );
    vec![quote_for_platform(range)]
}

pub(crate) fn log_command(restriction: &[String]) -> LogCommand {
    LogCommand::new(executables::SVN)
        .arg("log")
        .arg("-v")
        .args(restriction.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_date_argument() {
        let before = NaiveDate::from_ymd_opt(2002, 8, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let to = NaiveDate::from_ymd_opt(2002, 8, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let expected = if cfg!(windows) {
            "\"-r{2002-08-31}:{2002-08-01}\""
        } else {
            "-r{2002-08-31}:{2002-08-01}"
        };
        assert_eq!(date_argument(&before, &to), vec![expected.to_string()]);
    }

    #[test]
    fn test_log_command() {
        let cmd = log_command(&["-r{2002-08-31}:{2002-08-01}".to_string()]);
        assert_eq!(
            cmd.command_line(),
            vec!["svn", "log", "-v", "-r{2002-08-31}:{2002-08-01}"]
        );
        assert_eq!(log_command(&[]).command_line(), vec!["svn", "log", "-v"]);
    }
}
