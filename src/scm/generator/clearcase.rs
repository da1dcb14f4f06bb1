//! `cleartool lshistory`

use chrono::NaiveDateTime;

use super::LogCommand;
use crate::scm::constants::executables;

/// `\n` stays a literal backslash-n; cleartool expands it
const DEFAULT_COMMENT_FORMAT: &str = "%Sn - %c - Activity: %[activity]p\\n";

/// Only the start bound is expressible: `-since dd-MMM-yyyy`
pub(crate) fn date_argument(start: &NaiveDateTime, _end: &NaiveDateTime) -> Vec<String> {
    vec!["-since".to_string(), start.format("%d-%b-%Y").to_string()]
}

fn history_format(comment_format: Option<&str>) -> String {
    format!(
        "NAME:%En\\nDATE:%Nd\\nCOMM:%-12.12o - {}USER:%-8.8u\\n",
        comment_format.unwrap_or(DEFAULT_COMMENT_FORMAT)
    )
}

pub(crate) fn log_command(restriction: &[String], comment_format: Option<&str>) -> LogCommand {
    LogCommand::new(executables::CLEARCASE)
        .arg("lshistory")
        .arg("-fmt")
        .arg(history_format(comment_format))
        .arg("-recurse")
        .arg("-nco")
        .args(restriction.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_date_argument_uses_english_month() {
        let start = NaiveDate::from_ymd_opt(2003, 8, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(date_argument(&start, &start), vec!["-since", "05-Aug-2003"]);
    }

    #[test]
    fn test_log_command_default_format() {
        let cmd = log_command(&["-since".to_string(), "05-Aug-2003".to_string()], None);
        assert_eq!(
            cmd.command_line(),
            vec![
                "cleartool",
                "lshistory",
                "-fmt",
                "NAME:%En\\nDATE:%Nd\\nCOMM:%-12.12o - %Sn - %c - Activity: %[activity]p\\nUSER:%-8.8u\\n",
                "-recurse",
                "-nco",
                "-since",
                "05-Aug-2003",
            ]
        );
    }

    #[test]
    fn test_comment_format_override() {
        let cmd = log_command(&[], Some("%c\\n"));
        assert_eq!(
            cmd.args[2],
            "NAME:%En\\nDATE:%Nd\\nCOMM:%-12.12o - %c\\nUSER:%-8.8u\\n"
        );
        assert_eq!(cmd.args.len(), 5);
    }
}
