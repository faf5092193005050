//! Table columns and how each one is read from a container record

use serde_json::Value;

use super::record::ContainerRecord;
use crate::config::FieldSelection;

/// Shown when a record lacks the key behind a column
pub const NOT_AVAILABLE: &str = "N/A";

/// A table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Host,
    ContainerName,
    Ports,
    ComposePath,
    Network,
    Status,
    Uptime,
}

type Extractor = fn(&str, &ContainerRecord) -> String;

struct FieldSpec {
    field: Field,
    name: &'static str,
    extract: Extractor,
}

/// Canonical column order; the table always follows it
static FIELD_TABLE: [FieldSpec; 7] = [
    FieldSpec {
        field: Field::Host,
        name: "host",
        extract: |host, _| host.to_string(),
    },
    FieldSpec {
        field: Field::ContainerName,
        name: "container_name",
        extract: |_, record| record_value(record, "Names"),
    },
    FieldSpec {
        field: Field::Ports,
        name: "ports",
        extract: |_, record| record_value(record, "Ports"),
    },
    FieldSpec {
        field: Field::ComposePath,
        name: "compose_path",
        extract: |_, record| record_value(record, "ComposePath"),
    },
    FieldSpec {
        field: Field::Network,
        name: "network",
        extract: |_, record| record_value(record, "Network"),
    },
    FieldSpec {
        field: Field::Status,
        name: "status",
        extract: |_, record| record_value(record, "Status"),
    },
    FieldSpec {
        field: Field::Uptime,
        name: "uptime",
        extract: |_, record| record_value(record, "Uptime"),
    },
];

impl Field {
    /// Every field, in canonical order
    pub const ALL: [Field; 7] = [
        Field::Host,
        Field::ContainerName,
        Field::Ports,
        Field::ComposePath,
        Field::Network,
        Field::Status,
        Field::Uptime,
    ];

    fn spec(self) -> &'static FieldSpec {
        // FIELD_TABLE is indexed in the same order as the enum
        &FIELD_TABLE[self as usize]
    }

    /// Name used under `fields` in conf.json
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn from_name(name: &str) -> Option<Field> {
        FIELD_TABLE
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.field)
    }

    /// Column header: the name with only its first letter capitalized
    pub fn header(self) -> String {
        let mut chars = self.name().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }

    /// Cell value for one container on `host`
    pub fn extract(self, host: &str, record: &ContainerRecord) -> String {
        (self.spec().extract)(host, record)
    }
}

/// Render a record value as cell text, `N/A` when missing or null
fn record_value(record: &ContainerRecord, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Enabled fields in canonical order, regardless of conf.json key order
pub fn enabled_fields(selection: &FieldSelection) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|field| selection.is_enabled(*field))
        .collect()
}

/// One table row; cells line up with `fields`
pub fn project_row(fields: &[Field], host: &str, record: &ContainerRecord) -> Vec<String> {
    fields
        .iter()
        .map(|field| field.extract(host, record))
        .collect()
}
