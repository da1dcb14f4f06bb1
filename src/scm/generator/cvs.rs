//! `cvs -d <root> log`

use chrono::NaiveDateTime;

use super::{LogCommand, quote_for_platform};
use crate::scm::ScmError;
use crate::scm::connection;
use crate::scm::constants::executables;

pub(crate) fn date_argument(start: &NaiveDateTime, end: &NaiveDateTime) -> Vec<String> {
    let range = format!("{}<{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"));
    vec!["-d".to_string(), quote_for_platform(range)]
}

pub(crate) fn tag_argument(start: &str, end: Option<&str>) -> Vec<String> {
    vec![format!("-r{start}::{}", end.unwrap_or_default())]
}

pub(crate) fn log_command(connection: &str, restriction: &[String]) -> Result<LogCommand, ScmError> {
    let root = connection::cvs_root(connection)?;
    Ok(LogCommand::new(executables::CVS)
        .arg("-d")
        .arg(root)
        .arg("log")
        .args(restriction.iter().cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_date_argument() {
        let args = date_argument(&day(2003, 1, 1), &day(2003, 2, 1));
        let expected = if cfg!(windows) {
            "\"2003-01-01<2003-02-01\""
        } else {
            "2003-01-01<2003-02-01"
        };
        assert_eq!(args, vec!["-d".to_string(), expected.to_string()]);
    }

    #[test]
    fn test_tag_argument() {
        assert_eq!(tag_argument("v1_0", Some("v1_1")), vec!["-rv1_0::v1_1"]);
        assert_eq!(tag_argument("v1_0", None), vec!["-rv1_0::"]);
    }

    #[test]
    fn test_log_command_pserver() {
        let cmd = log_command(
            "scm:cvs:pserver:anoncvs@cvs.apache.org:/home/cvspublic:maven",
            &["-rv1::".to_string()],
        )
        .unwrap();
        assert_eq!(
            cmd.command_line(),
            vec!["cvs", "-d", ":pserver:anoncvs@cvs.apache.org:/home/cvspublic", "log", "-rv1::"]
        );
        assert!(cmd.env.is_empty());
    }

    #[test]
    fn test_log_command_local_unrestricted() {
        let cmd = log_command("scm:cvs:local:/home/cvspublic:maven", &[]).unwrap();
        assert_eq!(cmd.command_line(), vec!["cvs", "-d", "/home/cvspublic", "log"]);
    }

    #[test]
    fn test_log_command_rejects_bad_connection() {
        assert!(log_command("scm:cvs:pserver:host", &[]).is_err());
    }
}
