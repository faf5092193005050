//! Aggregated inventory across hosts
//!
//! Records are appended host by host and keep that order. The report can be
//! projected into a table view or written out as the JSON snapshot.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::fields::{Field, enabled_fields, project_row};
use super::record::ContainerRecord;
use crate::config::FieldSelection;

/// Errors that can occur while writing the report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Failed to serialize records
    #[error("Failed to serialize containers: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Serialized output was not valid UTF-8
    #[error("Snapshot is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Failed to write the snapshot file
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A container record and the host alias it came from
#[derive(Debug, Clone, PartialEq)]
pub struct HostRecord {
    pub host: String,
    pub record: ContainerRecord,
}

/// Table projection of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub fields: Vec<Field>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// All containers collected in one run, in host order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    entries: Vec<HostRecord>,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one host's records, keeping their order
    pub fn extend_host(&mut self, host: &str, records: Vec<ContainerRecord>) {
        self.entries.extend(records.into_iter().map(|record| HostRecord {
            host: host.to_string(),
            record,
        }));
    }

    pub fn entries(&self) -> &[HostRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project every record onto the enabled fields
    ///
    /// Headers and row cells come from the same field list, so they always
    /// line up.
    pub fn table(&self, selection: &FieldSelection) -> TableView {
        let fields = enabled_fields(selection);
        let headers = fields.iter().map(|field| field.header()).collect();
        let rows = self
            .entries
            .iter()
            .map(|entry| project_row(&fields, &entry.host, &entry.record))
            .collect();

        TableView {
            fields,
            headers,
            rows,
        }
    }

    /// Snapshot contents: a JSON array of the raw records, indented by four
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        let records: Vec<&ContainerRecord> = self.entries.iter().map(|e| &e.record).collect();

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records.serialize(&mut serializer)?;

        Ok(String::from_utf8(buf)?)
    }

    /// Write the snapshot to `path`, replacing whatever was there
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json_pretty()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| ReportError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut file = File::create(path).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        file.write_all(json.as_bytes())
            .map_err(|source| ReportError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Wrote {} containers to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(value: Value) -> ContainerRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn sample_report() -> AggregateReport {
        let mut report = AggregateReport::new();
        report.extend_host(
            "a",
            vec![
                record(json!({"Names": "web", "Status": "Up 1 hour"})),
                record(json!({"Names": "db", "Ports": "5432/tcp"})),
            ],
        );
        report.extend_host("b", vec![record(json!({"Names": "cache"}))]);
        report
    }

    fn selection(json: &str) -> FieldSelection {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_entries_keep_host_then_record_order() {
        let report = sample_report();
        let order: Vec<(&str, &Value)> = report
            .entries()
            .iter()
            .map(|e| (e.host.as_str(), &e.record["Names"]))
            .collect();

        assert_eq!(
            order,
            vec![
                ("a", &json!("web")),
                ("a", &json!("db")),
                ("b", &json!("cache"))
            ]
        );
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_table_columns_follow_selection() {
        let table = sample_report().table(&selection(r#"{"status": true, "host": true}"#));

        assert_eq!(table.headers, vec!["Host", "Status"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["a", "Up 1 hour"],
                vec!["a", "N/A"],
                vec!["b", "N/A"]
            ]
        );
    }

    #[test]
    fn test_table_rows_align_with_headers() {
        let table = sample_report().table(&FieldSelection::default());
        assert_eq!(table.headers.len(), Field::ALL.len());
        for row in &table.rows {
            assert_eq!(row.len(), table.headers.len());
        }
    }

    #[test]
    fn test_table_all_disabled() {
        let table = sample_report().table(&selection(r#"{"host": false}"#));
        assert!(table.headers.is_empty());
        assert!(table.rows.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_snapshot_json_is_array_of_records() {
        let json = sample_report().to_json_pretty().unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2], json!({"Names": "cache"}));
        assert!(json.contains("\n        \"Names\""));
    }

    #[test]
    fn test_snapshot_keeps_non_ascii_text() {
        let mut report = AggregateReport::new();
        report.extend_host("edge", vec![record(json!({"Names": "café-münchen"}))]);

        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"café-münchen\""));
    }

    #[test]
    fn test_empty_report_snapshot() {
        let json = AggregateReport::new().to_json_pretty().unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_write_snapshot_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docklist").join("docker_containers.json");

        sample_report().write_snapshot(&path).unwrap();
        let first: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(first.len(), 3);

        AggregateReport::new().write_snapshot(&path).unwrap();
        let second: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_write_snapshot_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go
        let err = sample_report().write_snapshot(dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }
}
