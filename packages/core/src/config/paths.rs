//! Path resolution for docklist
//!
//! docklist keeps both its configuration and its output snapshot under
//! `~/.config/docklist/` on every platform that has a home directory.
//! The SSH client config defaults to `~/.ssh/config` and can be overridden
//! with the `SSH_CONFIG_PATH` environment variable.

use std::path::{Path, PathBuf};

/// Environment variable overriding the SSH client config location
pub const SSH_CONFIG_PATH_ENV: &str = "SSH_CONFIG_PATH";

/// Get the configuration directory path
///
/// Returns `~/.config/docklist/` (XDG-style, also on macOS).
pub fn get_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".config").join("docklist"))
}

/// Get the full path to the config file
///
/// Returns: `{config_dir}/conf.json`
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join("conf.json"))
}

/// Get the full path to the container snapshot written after each run
///
/// Returns: `{config_dir}/docker_containers.json`
pub fn get_snapshot_path() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join("docker_containers.json"))
}

/// Get the path to the SSH client config file
///
/// `$SSH_CONFIG_PATH` wins when set and non-empty, otherwise `~/.ssh/config`.
pub fn get_ssh_config_path() -> Option<PathBuf> {
    ssh_config_path_from(std::env::var_os(SSH_CONFIG_PATH_ENV).map(PathBuf::from))
}

fn ssh_config_path_from(override_path: Option<PathBuf>) -> Option<PathBuf> {
    match override_path {
        Some(path) if !path.as_os_str().is_empty() => Some(expand_tilde(&path)),
        _ => dirs::home_dir().map(|home| home.join(".ssh").join("config")),
    }
}

/// Expand a leading `~` or `~/` against the user's home directory
///
/// Paths without a tilde prefix (and `~user` forms) are returned unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
