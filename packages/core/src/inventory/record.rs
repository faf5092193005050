//! Container record parsing
//!
//! `docker ps --format '{{json .}}'` prints one JSON object per container.
//! Each line is decoded on its own; a bad line is reported and skipped.

use serde_json::{Map, Value};

/// One container as reported by the remote docker daemon
///
/// Keys keep the daemon's order so the snapshot mirrors its output.
pub type ContainerRecord = Map<String, Value>;

/// An output line that did not decode to a JSON object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line: String,
    pub error: String,
}

/// Result of decoding a batch of output lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOutput {
    /// Decoded records, in line order
    pub records: Vec<ContainerRecord>,
    /// Lines that failed to decode, in line order
    pub rejected: Vec<RejectedLine>,
}

/// Decode docker's JSON-lines output
///
/// Blank lines are ignored. Anything else that is not a JSON object
/// (malformed text, arrays, bare strings) lands in `rejected`.
pub fn parse_docker_output<I, S>(lines: I) -> ParsedOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedOutput::default();

    for line in lines {
        let line = line.as_ref();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<ContainerRecord>(trimmed) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                tracing::debug!("Error decoding JSON: {}", line);
                parsed.rejected.push(RejectedLine {
                    line: line.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    parsed
}
