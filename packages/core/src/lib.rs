//! docklist-core - Core library for docklist
//!
//! Loads the fleet configuration, resolves hosts through the SSH client
//! config, lists their containers over SSH and aggregates the results.

pub mod config;
pub mod host;
pub mod inventory;
pub mod version;

// Re-export commonly used items for the CLI
pub use config::{Config, FieldSelection, HostKeyPolicy, load_config_from};
pub use host::{HostError, OpenSshExecutor, RemoteExecutor, SshConfigResolver, SshOptions};
pub use inventory::{AggregateReport, InventoryEvent, InventoryOutcome, run_inventory};
pub use version::{get_version, get_version_long};
