//! SSH config file parsing
//!
//! Resolves host aliases to connection parameters using the user's SSH
//! client config. Matching and precedence (first obtained value wins,
//! `Host *` as catch-all) follow ssh; host matching is delegated to
//! `ssh2-config`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ssh2_config::{ParseRule, SshConfig};

use super::error::HostError;
use crate::config::paths::expand_tilde;

/// Connection parameters for one host alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    /// Alias as listed in conf.json; also the label shown in the table
    pub alias: String,
    /// Hostname to connect to (the alias itself when unmapped)
    pub hostname: String,
    /// Login user, if the SSH config names one
    pub user: Option<String>,
    /// Private key to authenticate with
    pub identity_file: Option<String>,
    /// SSH port, if the SSH config names one
    pub port: Option<u16>,
}

impl ResolvedConnection {
    /// Connection with nothing but a hostname equal to the alias
    pub fn bare(alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            hostname: alias.clone(),
            alias,
            user: None,
            identity_file: None,
            port: None,
        }
    }

    /// Format the resolved settings for display
    pub fn display_settings(&self) -> String {
        let mut parts = vec![format!("HostName={}", self.hostname)];

        if let Some(user) = &self.user {
            parts.push(format!("User={user}"));
        }
        if let Some(port) = self.port {
            parts.push(format!("Port={port}"));
        }
        if let Some(key) = &self.identity_file {
            parts.push(format!("IdentityFile={key}"));
        }

        parts.join(", ")
    }
}

/// Parsed SSH client config, queried once per host
///
/// Host matching and most directives go through `ssh2-config`. Identity
/// files are tracked separately because `ssh2-config` keeps only the last
/// `IdentityFile` of a block, while ssh uses them in declaration order.
#[derive(Default)]
pub struct SshConfigResolver {
    config: SshConfig,
    identity_blocks: Vec<IdentityBlock>,
}

/// First `IdentityFile` of a block, with a matcher for the block's `Host` line
struct IdentityBlock {
    /// `None` for directives before the first `Host` line, which apply to every host
    matcher: Option<SshConfig>,
    identity_file: String,
}

impl IdentityBlock {
    fn matches(&self, alias: &str) -> bool {
        match &self.matcher {
            None => true,
            Some(matcher) => matcher.query(alias).identity_file.is_some(),
        }
    }
}

impl SshConfigResolver {
    /// Parse the SSH config at `path`
    ///
    /// A missing or unparseable file is an error; startup treats it as fatal.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let file = File::open(path).map_err(|e| {
            HostError::SshConfigRead(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mut reader = BufReader::new(file);
        let resolver = Self::parse(&mut reader)?;

        tracing::debug!("Parsed SSH config from {}", path.display());
        Ok(resolver)
    }

    /// Parse SSH config text from any buffered reader
    ///
    /// `Match` blocks are not supported: their directives are dropped with a
    /// warning instead of leaking into the preceding `Host` block.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self, HostError> {
        let mut text = String::new();
        std::io::Read::read_to_string(reader, &mut text)
            .map_err(|e| HostError::SshConfigRead(format!("Failed to read SSH config: {e}")))?;

        let scanned = scan_config(&text);
        for line in &scanned.match_lines {
            tracing::warn!(
                "Ignoring unsupported Match block at line {} of SSH config",
                line
            );
        }

        // Be lenient with SSH config options we don't use
        let config = parse_ssh_config(&scanned.text)?;

        let identity_blocks = scanned
            .blocks
            .into_iter()
            .filter_map(|block| {
                let identity_file = block.identity_file?;
                let matcher = match block.patterns {
                    None => Ok(None),
                    Some(patterns) => parse_ssh_config(&format!(
                        "Host {patterns}\n    IdentityFile {MATCH_MARKER}\n"
                    ))
                    .map(Some),
                };
                Some(matcher.map(|matcher| IdentityBlock {
                    matcher,
                    identity_file,
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            identity_blocks,
        })
    }

    /// Resolve connection parameters for `alias`
    ///
    /// Falls back to the alias as hostname and to `default_key` as identity
    /// file. An empty `default_key` means no fallback key.
    pub fn resolve(&self, alias: &str, default_key: &str) -> ResolvedConnection {
        let params = self.config.query(alias);

        // First IdentityFile declared in a matching block, as ssh tries them
        let identity_file = self
            .identity_blocks
            .iter()
            .find(|block| block.matches(alias))
            .map(|block| block.identity_file.as_str())
            .or((!default_key.is_empty()).then_some(default_key))
            .map(|path| expand_tilde(Path::new(path)).to_string_lossy().to_string());

        ResolvedConnection {
            alias: alias.to_string(),
            hostname: params.host_name.unwrap_or_else(|| alias.to_string()),
            user: params.user,
            identity_file,
            port: params.port,
        }
    }
}

/// Stands in for the real key in per-block matchers; only its presence matters
const MATCH_MARKER: &str = "/docklist/host-match";

fn parse_ssh_config(text: &str) -> Result<SshConfig, HostError> {
    SshConfig::default()
        .parse(&mut text.as_bytes(), ParseRule::ALLOW_UNKNOWN_FIELDS)
        .map_err(|e| HostError::SshConfigRead(format!("Failed to parse SSH config: {e}")))
}

/// A `Host` block (or the preamble before the first one)
struct HostBlock {
    patterns: Option<String>,
    identity_file: Option<String>,
}

/// SSH config text with `Match` blocks removed, plus per-block identity files
struct ScannedConfig {
    text: String,
    blocks: Vec<HostBlock>,
    /// 1-based line numbers of dropped `Match` lines
    match_lines: Vec<usize>,
}

fn scan_config(text: &str) -> ScannedConfig {
    let mut scanned = ScannedConfig {
        text: String::with_capacity(text.len()),
        blocks: Vec::new(),
        match_lines: Vec::new(),
    };
    let mut current = HostBlock {
        patterns: None,
        identity_file: None,
    };
    let mut in_match = false;

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        let keep = if trimmed.is_empty() || trimmed.starts_with('#') {
            !in_match
        } else {
            let (keyword, value) = split_directive(trimmed);
            match keyword.to_ascii_lowercase().as_str() {
                "match" => {
                    in_match = true;
                    scanned.match_lines.push(index + 1);
                    scanned.blocks.push(current);
                    current = HostBlock {
                        patterns: None,
                        identity_file: None,
                    };
                    false
                }
                "host" => {
                    in_match = false;
                    scanned.blocks.push(current);
                    current = HostBlock {
                        patterns: Some(value.to_string()),
                        identity_file: None,
                    };
                    true
                }
                "identityfile" if !in_match => {
                    if current.identity_file.is_none() {
                        current.identity_file = Some(unquote(value).to_string());
                    }
                    true
                }
                _ => !in_match,
            }
        };

        if keep {
            scanned.text.push_str(line);
            scanned.text.push('\n');
        }
    }

    // A block opened by Match never gets an identity file, so it can't match
    scanned.blocks.push(current);
    scanned
}

/// Split `Keyword value` or `Keyword=value`
fn split_directive(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (keyword, rest) = line.split_at(end);
    let value = rest.trim_start().strip_prefix('=').unwrap_or(rest);
    (keyword, value.trim())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FLEET_CONFIG: &str = "\
Host web-1
    HostName 10.0.0.5
    User deploy
    IdentityFile /keys/web_key
    IdentityFile /keys/web_key_old
    Port 2222

Host db-*
    User dba
    Compression yes

Host *
    User fallback
    IdentityFile /keys/id_default
";

    fn resolver(text: &str) -> SshConfigResolver {
        let mut bytes = text.as_bytes();
        SshConfigResolver::parse(&mut bytes).unwrap()
    }

    #[test]
    fn test_resolve_explicit_host_block() {
        let conn = resolver(FLEET_CONFIG).resolve("web-1", "/keys/fallback");

        assert_eq!(conn.alias, "web-1");
        assert_eq!(conn.hostname, "10.0.0.5");
        assert_eq!(conn.user.as_deref(), Some("deploy"));
        assert_eq!(conn.identity_file.as_deref(), Some("/keys/web_key"));
        assert_eq!(conn.port, Some(2222));
    }

    #[test]
    fn test_resolve_wildcard_block_then_catch_all() {
        let conn = resolver(FLEET_CONFIG).resolve("db-3", "/keys/fallback");

        assert_eq!(conn.hostname, "db-3");
        assert_eq!(conn.user.as_deref(), Some("dba"));
        assert_eq!(conn.identity_file.as_deref(), Some("/keys/id_default"));
        assert_eq!(conn.port, None);
    }

    #[test]
    fn test_resolve_unmapped_alias_uses_defaults() {
        let conn = SshConfigResolver::default().resolve("ai", "/keys/fallback");

        assert_eq!(conn.hostname, "ai");
        assert!(conn.user.is_none());
        assert_eq!(conn.identity_file.as_deref(), Some("/keys/fallback"));
        assert!(conn.port.is_none());
    }

    #[test]
    fn test_resolve_empty_default_key_means_no_identity() {
        let conn = SshConfigResolver::default().resolve("ai", "");
        assert!(conn.identity_file.is_none());
    }

    #[test]
    fn test_resolve_expands_tilde_in_default_key() {
        let conn = SshConfigResolver::default().resolve("ai", "~/.ssh/id_fleet");
        let home = dirs::home_dir().unwrap();
        assert_eq!(
            conn.identity_file,
            Some(home.join(".ssh/id_fleet").to_string_lossy().to_string())
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FLEET_CONFIG.as_bytes()).unwrap();

        let conn = SshConfigResolver::load(file.path())
            .unwrap()
            .resolve("web-1", "");
        assert_eq!(conn.hostname, "10.0.0.5");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SshConfigResolver::load(&dir.path().join("config"));
        assert!(matches!(result, Err(HostError::SshConfigRead(_))));
    }

    #[test]
    fn test_catch_all_first_wins_over_later_blocks() {
        let conn = resolver(
            "\
Host *
    User fallback
    IdentityFile /keys/star

Host web-1
    User deploy
    IdentityFile /keys/web
",
        )
        .resolve("web-1", "/keys/default");

        assert_eq!(conn.user.as_deref(), Some("fallback"));
        assert_eq!(conn.identity_file.as_deref(), Some("/keys/star"));
    }

    #[test]
    fn test_specific_block_before_catch_all_wins() {
        let conn = resolver(FLEET_CONFIG).resolve("web-1", "");
        assert_eq!(conn.identity_file.as_deref(), Some("/keys/web_key"));

        let conn = resolver(FLEET_CONFIG).resolve("other", "/keys/default");
        assert_eq!(conn.user.as_deref(), Some("fallback"));
        assert_eq!(conn.identity_file.as_deref(), Some("/keys/id_default"));
    }

    #[test]
    fn test_first_identity_file_in_block_wins() {
        let conn = resolver(
            "\
Host box
    IdentityFile=/keys/first
    IdentityFile /keys/second
",
        )
        .resolve("box", "");

        assert_eq!(conn.identity_file.as_deref(), Some("/keys/first"));
    }

    #[test]
    fn test_identity_file_before_any_host_applies_everywhere() {
        let text = "\
IdentityFile \"/keys/global\"

Host box
    IdentityFile /keys/box
";
        assert_eq!(
            resolver(text).resolve("box", "").identity_file.as_deref(),
            Some("/keys/global")
        );
        assert_eq!(
            resolver(text).resolve("other", "").identity_file.as_deref(),
            Some("/keys/global")
        );
    }

    #[test]
    fn test_match_block_does_not_leak_into_previous_host() {
        let resolver = resolver(
            "\
Host web
    HostName 1.2.3.4

Match host foo
    User x
    IdentityFile /keys/matched
",
        );

        let conn = resolver.resolve("web", "/keys/default");
        assert_eq!(conn.hostname, "1.2.3.4");
        assert!(conn.user.is_none());
        assert_eq!(conn.identity_file.as_deref(), Some("/keys/default"));
    }

    #[test]
    fn test_host_block_after_match_still_applies() {
        let resolver = resolver(
            "\
Match exec \"true\"
    User x

Host db
    HostName 10.0.0.9
    User dba
    IdentityFile /keys/db
",
        );

        let conn = resolver.resolve("db", "");
        assert_eq!(conn.hostname, "10.0.0.9");
        assert_eq!(conn.user.as_deref(), Some("dba"));
        assert_eq!(conn.identity_file.as_deref(), Some("/keys/db"));
        assert!(resolver.resolve("web", "").user.is_none());
    }

    #[test]
    fn test_split_directive_forms() {
        assert_eq!(split_directive("Host web-1 web-2"), ("Host", "web-1 web-2"));
        assert_eq!(split_directive("IdentityFile=/k"), ("IdentityFile", "/k"));
        assert_eq!(split_directive("Port = 22"), ("Port", "22"));
        assert_eq!(split_directive("Compression"), ("Compression", ""));
    }

    #[test]
    fn test_display_settings() {
        let conn = ResolvedConnection {
            alias: "web-1".to_string(),
            hostname: "10.0.0.5".to_string(),
            user: Some("ubuntu".to_string()),
            identity_file: Some("/keys/web".to_string()),
            port: Some(2222),
        };

        let display = conn.display_settings();
        assert!(display.contains("HostName=10.0.0.5"));
        assert!(display.contains("User=ubuntu"));
        assert!(display.contains("Port=2222"));
        assert!(display.contains("IdentityFile=/keys/web"));
    }

    #[test]
    fn test_bare_connection() {
        let conn = ResolvedConnection::bare("a");
        assert_eq!(conn.hostname, "a");
        assert!(conn.user.is_none() && conn.identity_file.is_none());
    }
}
