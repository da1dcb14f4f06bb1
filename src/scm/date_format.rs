//! Java-style date patterns
//!
//! Users and SCM clients describe dates with `SimpleDateFormat` letters
//! (`yyyy-MM-dd`, `dd-MMM-yyyy`, `yyyy/MM/dd HH:mm:ss`). [`DateFormat`] keeps
//! the source pattern for display and the equivalent chrono format string
//! for parsing and rendering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::ScmError;
use super::constants::DEFAULT_DATE_FORMAT;

/// A compiled date pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    strftime: String,
    has_time: bool,
    has_offset: bool,
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_FORMAT.to_string(),
            strftime: "%Y-%m-%d".to_string(),
            has_time: false,
            has_offset: false,
        }
    }
}

impl DateFormat {
    /// Compile a `SimpleDateFormat` pattern
    ///
    /// Supported letters: `y M d H h m s S a E z Z X`. Text between single
    /// quotes is literal, `''` is a literal quote.
    pub fn new(pattern: &str) -> Result<Self, ScmError> {
        let invalid = |reason: String| ScmError::InvalidDateFormat {
            pattern: pattern.to_string(),
            reason,
        };

        let mut strftime = String::with_capacity(pattern.len() * 2);
        let mut has_time = false;
        let mut has_offset = false;
        let mut chars = pattern.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    strftime.push('\'');
                    continue;
                }
                let mut closed = false;
                while let Some(quoted) = chars.next() {
                    if quoted == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            strftime.push('\'');
                            continue;
                        }
                        closed = true;
                        break;
                    }
                    push_literal(&mut strftime, quoted);
                }
                if !closed {
                    return Err(invalid("unterminated quote".to_string()));
                }
                continue;
            }

            if !ch.is_ascii_alphabetic() {
                push_literal(&mut strftime, ch);
                continue;
            }

            let mut count = 1;
            while chars.peek() == Some(&ch) {
                chars.next();
                count += 1;
            }

            let item = match ch {
                'y' if count == 2 => "%y",
                'y' => "%Y",
                'M' => match count {
                    1 => "%-m",
                    2 => "%m",
                    3 => "%b",
                    _ => "%B",
                },
                'd' if count == 1 => "%-d",
                'd' => "%d",
                'E' if count < 4 => "%a",
                'E' => "%A",
                'H' | 'h' | 'm' | 's' | 'S' | 'a' => {
                    has_time = true;
                    match ch {
                        'H' => "%H",
                        'h' => "%I",
                        'm' => "%M",
                        's' => "%S",
                        'S' => "%3f",
                        _ => "%p",
                    }
                }
                'z' => "%Z",
                'Z' => {
                    has_offset = true;
                    "%z"
                }
                'X' => {
                    has_offset = true;
                    "%:z"
                }
                other => return Err(invalid(format!("unsupported pattern letter '{other}'"))),
            };
            strftime.push_str(item);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            strftime,
            has_time,
            has_offset,
        })
    }

    /// The pattern as configured
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render a timestamp with this pattern
    pub fn format(&self, date: &NaiveDateTime) -> String {
        date.and_utc().format(&self.strftime).to_string()
    }

    /// Parse a complete value
    ///
    /// Values carrying a UTC offset are normalized to UTC. Patterns without a
    /// time component yield midnight.
    pub fn parse(&self, value: &str) -> Result<NaiveDateTime, ScmError> {
        let value = value.trim();
        let parsed = if self.has_offset {
            DateTime::parse_from_str(value, &self.strftime).map(|d| d.naive_utc())
        } else if self.has_time {
            NaiveDateTime::parse_from_str(value, &self.strftime)
        } else {
            NaiveDate::parse_from_str(value, &self.strftime).map(|d| d.and_time(NaiveTime::MIN))
        };
        parsed.map_err(|_| ScmError::unparseable_date(value))
    }

    /// Parse a timestamp at the start of `value`, returning the unparsed rest
    pub fn parse_prefix<'a>(&self, value: &'a str) -> Result<(NaiveDateTime, &'a str), ScmError> {
        let trimmed = value.trim_start();
        let parsed = if self.has_offset {
            DateTime::parse_and_remainder(trimmed, &self.strftime).map(|(d, rest)| (d.naive_utc(), rest))
        } else if self.has_time {
            NaiveDateTime::parse_and_remainder(trimmed, &self.strftime)
        } else {
            NaiveDate::parse_and_remainder(trimmed, &self.strftime)
                .map(|(d, rest)| (d.and_time(NaiveTime::MIN), rest))
        };
        parsed.map_err(|_| ScmError::unparseable_date(value.trim()))
    }
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}
