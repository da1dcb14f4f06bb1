//! XML change log document
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" ?>
//! <changelog>
//! <changeset start="2004-01-01" end="2004-02-01">
//! 	<changelog-entry>
//! 		<date>2004-01-15</date>
//! 		<time>10:30:00</time>
//! 		<author><![CDATA[jim]]></author>
//! 		<file>
//! 			<name>src/lib.c</name>
//! 			<revision>1.2</revision>
//! 		</file>
//! 		<msg><![CDATA[Fix the build]]></msg>
//! 	</changelog-entry>
//! </changeset>
//! </changelog>
//! ```

use std::path::Path;

use chrono::NaiveTime;
use quick_xml::escape::escape;
use serde::Deserialize;

use super::ChangeLogError;
use crate::model::{ChangeLogEntry, ChangeLogFile, ChangeLogSet};
use crate::scm::DateFormat;

const CDATA_END: &str = "]]>";
const CDATA_END_REPLACEMENT: &str = "] ] >";
const TIME_FORMAT: &str = "%H:%M:%S";

fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace(CDATA_END, CDATA_END_REPLACEMENT))
}

fn write_entry(out: &mut String, entry: &ChangeLogEntry, date_format: &DateFormat) {
    out.push_str("\t<changelog-entry>\n");
    out.push_str(&format!("\t\t<date>{}</date>\n", escape(date_format.format(&entry.date).as_str())));
    out.push_str(&format!("\t\t<time>{}</time>\n", entry.time_formatted()));
    out.push_str(&format!("\t\t<author>{}</author>\n", cdata(&entry.author)));
    for file in &entry.files {
        out.push_str("\t\t<file>\n");
        out.push_str(&format!("\t\t\t<name>{}</name>\n", escape(file.name.as_str())));
        out.push_str(&format!("\t\t\t<revision>{}</revision>\n", escape(file.revision.as_str())));
        out.push_str("\t\t</file>\n");
    }
    out.push_str(&format!("\t\t<msg>{}</msg>\n", cdata(&entry.comment)));
    out.push_str("\t</changelog-entry>\n");
}

/// Render change sets as a complete XML document
///
/// `encoding` only names the encoding in the declaration; the returned text
/// is always a Rust string.
pub fn to_xml(sets: &[ChangeLogSet], date_format: &DateFormat, encoding: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("<?xml version=\"1.0\" encoding=\"{}\" ?>\n", escape(encoding)));
    out.push_str("<changelog>\n");
    for set in sets {
        out.push_str(&format!("<changeset start=\"{}\"", escape(set.start())));
        if let Some(end) = set.end() {
            out.push_str(&format!(" end=\"{}\"", escape(end)));
        }
        out.push_str(">\n");
        for entry in set.entries() {
            write_entry(&mut out, entry, date_format);
        }
        out.push_str("</changeset>\n");
    }
    out.push_str("</changelog>\n");
    out
}

/// Write the document to `path`, creating parent directories
pub fn write_xml(
    path: &Path,
    sets: &[ChangeLogSet],
    date_format: &DateFormat,
    encoding: &str,
) -> Result<(), ChangeLogError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let document = to_xml(sets, date_format, encoding);
    if !encoding.eq_ignore_ascii_case("UTF-8") && !document.is_ascii() {
        tracing::warn!(
            "Change log declares {} but contains non-ASCII text, which is written as UTF-8",
            encoding
        );
    }
    std::fs::write(path, document)?;
    tracing::info!("Wrote change log to {}", path.display());
    Ok(())
}

#[derive(Debug, Deserialize)]
struct XmlChangeLog {
    #[serde(rename = "changeset", default)]
    sets: Vec<XmlChangeSet>,
}

#[derive(Debug, Deserialize)]
struct XmlChangeSet {
    #[serde(rename = "@start", default)]
    start: String,
    #[serde(rename = "@end", default)]
    end: Option<String>,
    #[serde(rename = "changelog-entry", default)]
    entries: Vec<XmlEntry>,
}

#[derive(Debug, Deserialize)]
struct XmlEntry {
    date: String,
    time: String,
    #[serde(default)]
    author: String,
    #[serde(rename = "file", default)]
    files: Vec<XmlFile>,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Deserialize)]
struct XmlFile {
    name: String,
    #[serde(default)]
    revision: String,
}

impl XmlEntry {
    fn into_entry(self, date_format: &DateFormat) -> Result<ChangeLogEntry, ChangeLogError> {
        let day = date_format.parse(&self.date)?.date();
        let time = NaiveTime::parse_from_str(self.time.trim(), TIME_FORMAT).map_err(|_| {
            ChangeLogError::InvalidXmlTime {
                value: self.time.clone(),
            }
        })?;

        let mut entry = ChangeLogEntry::new(day.and_time(time), self.author, self.msg);
        for file in self.files {
            entry.add_file(ChangeLogFile::with_revision(file.name, file.revision));
        }
        Ok(entry)
    }
}

/// Read change sets back from a document produced by [`to_xml`]
pub fn from_xml(document: &str, date_format: &DateFormat) -> Result<Vec<ChangeLogSet>, ChangeLogError> {
    let changelog: XmlChangeLog = quick_xml::de::from_str(document)?;
    changelog
        .sets
        .into_iter()
        .map(|set| {
            let entries = set
                .entries
                .into_iter()
                .map(|entry| entry.into_entry(date_format))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ChangeLogSet::new(entries, set.start, set.end))
        })
        .collect()
}

pub fn read_xml(path: &Path, date_format: &DateFormat) -> Result<Vec<ChangeLogSet>, ChangeLogError> {
    let document = std::fs::read_to_string(path).map_err(|e| ChangeLogError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    from_xml(&document, date_format)
}
