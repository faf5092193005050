//! Configuration schema for docklist
//!
//! Defines the structure and defaults for the conf.json file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::inventory::Field;

/// Main configuration structure for docklist
///
/// Serialized to/from `~/.config/docklist/conf.json`. Unknown top-level
/// keys are ignored so the file can carry notes for other tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// SSH host aliases to inventory, processed in this order
    pub hosts: Vec<String>,

    /// Identity file used when the SSH config names none for a host
    pub ssh_key_path: String,

    /// Which columns appear in the table (default: all)
    #[serde(default)]
    pub fields: FieldSelection,

    /// How unknown or changed host keys are handled (default: "strict")
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,

    /// Known hosts file for "strict" and "accept-new" (default: ssh's own)
    #[serde(default)]
    pub known_hosts_path: Option<String>,

    /// SSH connect timeout in seconds (default: transport default)
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl Config {
    /// Create a config for the given hosts and fallback key, everything else default
    pub fn new(hosts: Vec<String>, ssh_key_path: impl Into<String>) -> Self {
        Self {
            hosts,
            ssh_key_path: ssh_key_path.into(),
            fields: FieldSelection::default(),
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path: None,
            connect_timeout_secs: None,
        }
    }
}

/// Host key verification policy for SSH sessions
///
/// Maps onto OpenSSH's `StrictHostKeyChecking`:
/// - `strict`: only hosts already in known_hosts are accepted
/// - `accept-new`: unknown hosts are added to known_hosts, changed keys rejected
/// - `insecure`: any key is accepted and nothing is recorded
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    #[default]
    Strict,
    AcceptNew,
    Insecure,
}

/// Field name to enabled flag, as written under `fields` in conf.json
///
/// Fields that are absent from the map are disabled. When the whole
/// `fields` key is absent every known field is enabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldSelection(BTreeMap<String, bool>);

impl Default for FieldSelection {
    fn default() -> Self {
        Field::ALL
            .iter()
            .map(|field| (field.name().to_string(), true))
            .collect()
    }
}

impl FromIterator<(String, bool)> for FieldSelection {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FieldSelection {
    /// Whether a field is switched on
    pub fn is_enabled(&self, field: Field) -> bool {
        self.0.get(field.name()).copied().unwrap_or(false)
    }

    /// Keys that name no known field
    ///
    /// These are ignored when building the table; callers may warn about them.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|key| Field::from_name(key).is_none())
            .collect()
    }
}
