//! Renders content records as plain text, Markdown or XML.
//!
//! Markdown fences and XML CDATA sections carry the content verbatim. Content
//! that contains "```" or `]]>` therefore ends the block early; this is left
//! visible rather than rewritten so the copied text stays byte-identical.

use crate::aggregator::ContentRecord;
use crate::errors::PathClipError;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR_WIDTH: usize = 80;
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Markdown,
    Xml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = PathClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(OutputFormat::Plain),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "xml" => Ok(OutputFormat::Xml),
            other => Err(PathClipError::ConfigError(format!(
                "unknown output format '{}' (expected plain, markdown or xml)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ContentFormatter {
    format: OutputFormat,
    include_headers: bool,
}

impl ContentFormatter {
    pub fn new(format: OutputFormat, include_headers: bool) -> Self {
        ContentFormatter {
            format,
            include_headers,
        }
    }

    /// An empty record list gives an empty string in every format.
    pub fn format(&self, records: &[ContentRecord]) -> String {
        if records.is_empty() {
            return String::new();
        }
        match self.format {
            OutputFormat::Plain => self.join(records, |r| self.plain(r)),
            OutputFormat::Markdown => self.join(records, |r| self.markdown(r)),
            OutputFormat::Xml => self.xml(records),
        }
    }

    fn join(&self, records: &[ContentRecord], render: impl Fn(&ContentRecord) -> String) -> String {
        records.iter().map(render).collect::<Vec<_>>().join("\n\n")
    }

    fn plain(&self, record: &ContentRecord) -> String {
        if !self.include_headers {
            return record.content.clone();
        }
        let separator = "=".repeat(SEPARATOR_WIDTH);
        format!(
            "{sep}\nFile: {path}\nSize: {size} bytes\nLast Modified: {modified}\n{sep}\n\n{content}",
            sep = separator,
            path = record.path.display(),
            size = record.size,
            modified = iso_timestamp(&record.last_modified),
            content = record.content,
        )
    }

    fn markdown(&self, record: &ContentRecord) -> String {
        let language = record
            .path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let newline = if record.content.ends_with('\n') { "" } else { "\n" };
        let fence = format!("```{}\n{}{}```", language, record.content, newline);

        if !self.include_headers {
            return fence;
        }

        let name = record
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| record.path.display().to_string());
        format!(
            "## {}\n\n- **Path:** {}\n- **Size:** {} bytes\n- **Last Modified:** {}\n\n{}",
            name,
            record.path.display(),
            record.size,
            iso_timestamp(&record.last_modified),
            fence
        )
    }

    fn xml(&self, records: &[ContentRecord]) -> String {
        let mut out = String::new();
        out.push_str(XML_DECLARATION);
        out.push_str("\n<files>\n");
        for record in records {
            if self.include_headers {
                let path = record.path.to_string_lossy();
                out.push_str(&format!(
                    "  <file path=\"{}\" size=\"{}\" lastModified=\"{}\">\n",
                    escape(&*path),
                    record.size,
                    iso_timestamp(&record.last_modified)
                ));
            } else {
                out.push_str("  <file>\n");
            }
            out.push_str("    <content><![CDATA[");
            out.push_str(&record.content);
            out.push_str("]]></content>\n  </file>\n");
        }
        out.push_str("</files>");
        out
    }
}

pub fn format_records(records: &[ContentRecord], format: OutputFormat, include_headers: bool) -> String {
    ContentFormatter::new(format, include_headers).format(records)
}

pub fn iso_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
