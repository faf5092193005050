//! Configuration management for docklist
//!
//! Loads the JSON configuration naming the hosts to inventory, the fallback
//! SSH key and the table fields. Comments are tolerated (JSONC), everything
//! else must be valid JSON. A missing or malformed file is fatal.

pub mod paths;
pub mod schema;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use jsonc_parser::parse_to_serde_value;

pub use paths::{get_config_dir, get_config_path, get_snapshot_path, get_ssh_config_path};
pub use schema::{Config, FieldSelection, HostKeyPolicy};

/// Load configuration from `config_path` (normally `get_config_path()`)
///
/// docklist has nothing useful to do without a host list, so a missing
/// file is an error rather than a reason to write defaults.
pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let mut file = File::open(config_path)
        .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config = parse_config(&contents).with_context(|| {
        format!(
            "Invalid configuration in {}. Check for missing keys or invalid values.",
            config_path.display()
        )
    })?;

    for key in config.fields.unknown_keys() {
        tracing::warn!("Ignoring unknown field '{}' in config", key);
    }
    if config.hosts.is_empty() {
        tracing::warn!("No hosts configured in {}", config_path.display());
    }

    tracing::debug!(
        "Loaded config with {} hosts from {}",
        config.hosts.len(),
        config_path.display()
    );
    Ok(config)
}

/// Parse config text (JSON with optional comments)
pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed_value = parse_to_serde_value(contents, &Default::default())
        .map_err(|e| anyhow::anyhow!("Invalid JSON in config file: {}", e))?
        .ok_or_else(|| anyhow::anyhow!("Config file is empty"))?;

    let config: Config = serde_json::from_value(parsed_value)?;
    Ok(config)
}
