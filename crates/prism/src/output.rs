//! JSON and JSONL emission for identification records.

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Write records in the chosen format.
///
/// JSON emits a single array, pretty-printed on request; JSONL emits one
/// object per line and is never pretty-printed.
pub fn write_records<W: Write, T: Serialize>(
    writer: &mut W,
    records: &[T],
    format: OutputFormat,
    pretty: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut *writer, records).map_err(io::Error::other)?;
            } else {
                serde_json::to_writer(&mut *writer, records).map_err(io::Error::other)?;
            }
            writeln!(writer)
        }
        OutputFormat::JsonLines => {
            for record in records {
                serde_json::to_writer(&mut *writer, record).map_err(io::Error::other)?;
                writeln!(writer)?;
            }
            Ok(())
        }
    }
}
