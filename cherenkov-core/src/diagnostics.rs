//! Error reporting for the event pipeline
//!
//! Formats reader and ingestion errors for people, pointing at the offending
//! source line when one is known.

use crate::ingest::IngestError;
use crate::record::ReadError;

/// Format a read error with context from the source text
pub fn format_read_error(error: &ReadError, source: Option<&str>) -> String {
    let mut msg = format!("Read error: {}", error);

    if let (Some(line), Some(source)) = (error.line(), source) {
        if let Some(text) = line.checked_sub(1).and_then(|idx| source.lines().nth(idx)) {
            msg.push_str(&format!("\n  at line {}: {}", line, text.trim_end()));
        }
    }

    msg
}

/// Format an ingestion error, with source context for malformed input
pub fn format_ingest_error(error: &IngestError, source: Option<&str>) -> String {
    match error {
        IngestError::Malformed(read) => format_read_error(read, source),
        other => format!("Error: {}", other),
    }
}
