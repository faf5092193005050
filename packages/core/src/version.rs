//! Version information for docklist

/// Get the current version string
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the long version string with build information
///
/// Appends the git commit when the build sets `DOCKLIST_GIT_HASH`.
pub fn get_version_long() -> String {
    let version = get_version();
    let git_hash = option_env!("DOCKLIST_GIT_HASH").unwrap_or("unknown");

    format!("{version} (git: {git_hash})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version_returns_valid_semver() {
        let version = get_version();
        assert!(!version.is_empty());
        let parts: Vec<&str> = version.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_get_version_long_contains_version() {
        assert!(get_version_long().contains(&get_version()));
    }
}
