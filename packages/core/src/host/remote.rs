//! Remote command execution over SSH
//!
//! Runs a single command on a remote host through the OpenSSH client and
//! collects its stdout. Each session is a child `ssh` process owned by a
//! guard that kills and reaps it on drop, so the connection is released on
//! every exit path.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use super::error::HostError;
use super::ssh_config::ResolvedConnection;
use crate::config::{Config, HostKeyPolicy};

/// Lists running containers, one JSON object per line
pub const DOCKER_PS_COMMAND: &str = "docker ps --format '{{json .}}'";

/// User that runs docker without privilege elevation
const SUPERUSER: &str = "root";

/// Build the docker listing command for the user the session logs in as
///
/// Anyone but root goes through `sudo`.
pub fn remote_command(effective_user: &str) -> String {
    if effective_user == SUPERUSER {
        DOCKER_PS_COMMAND.to_string()
    } else {
        format!("sudo {DOCKER_PS_COMMAND}")
    }
}

/// User the remote session authenticates as
///
/// With `-F none` and no `-l`, ssh logs in as the local user.
pub fn effective_user(conn: &ResolvedConnection) -> String {
    conn.user.clone().unwrap_or_else(whoami::username)
}

/// Which credentials a connection presents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    UserAndKey,
    UserOnly,
    KeyOnly,
    Default,
}

impl AuthMode {
    pub fn for_connection(conn: &ResolvedConnection) -> Self {
        match (conn.user.is_some(), conn.identity_file.is_some()) {
            (true, true) => AuthMode::UserAndKey,
            (true, false) => AuthMode::UserOnly,
            (false, true) => AuthMode::KeyOnly,
            (false, false) => AuthMode::Default,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            AuthMode::UserAndKey => "Connecting with user and key file...",
            AuthMode::UserOnly => "Connecting with user only...",
            AuthMode::KeyOnly => "Connecting with key file only...",
            AuthMode::Default => "Connecting with default settings...",
        }
    }
}

/// Runs a command on a resolved host and returns its stdout lines
///
/// The inventory loop only talks to hosts through this trait.
pub trait RemoteExecutor {
    fn run(&self, conn: &ResolvedConnection, command: &str) -> Result<Vec<String>, HostError>;
}

/// Transport options shared by every session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshOptions {
    pub host_key_policy: HostKeyPolicy,
    pub known_hosts_path: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

impl From<&Config> for SshOptions {
    fn from(config: &Config) -> Self {
        Self {
            host_key_policy: config.host_key_policy,
            known_hosts_path: config.known_hosts_path.clone(),
            connect_timeout_secs: config.connect_timeout_secs,
        }
    }
}

/// Executes commands by spawning the OpenSSH client
#[derive(Debug, Clone, Default)]
pub struct OpenSshExecutor {
    options: SshOptions,
}

impl OpenSshExecutor {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    /// Arguments passed to `ssh` for one session
    ///
    /// `-F none` keeps ssh from re-reading its config: the resolved
    /// connection is authoritative.
    pub fn ssh_args(&self, conn: &ResolvedConnection, command: &str) -> Vec<String> {
        let mut args: Vec<String> = vec!["-F".into(), "none".into(), "-T".into()];

        // Suppress prompts, fail fast on auth issues
        args.extend(["-o".into(), "BatchMode=yes".into()]);

        match self.options.host_key_policy {
            HostKeyPolicy::Strict => {
                args.extend(["-o".into(), "StrictHostKeyChecking=yes".into()]);
                self.push_known_hosts(&mut args);
            }
            HostKeyPolicy::AcceptNew => {
                args.extend(["-o".into(), "StrictHostKeyChecking=accept-new".into()]);
                self.push_known_hosts(&mut args);
            }
            HostKeyPolicy::Insecure => {
                args.extend(["-o".into(), "StrictHostKeyChecking=no".into()]);
                args.extend(["-o".into(), "UserKnownHostsFile=/dev/null".into()]);
            }
        }

        if let Some(secs) = self.options.connect_timeout_secs {
            args.extend(["-o".into(), format!("ConnectTimeout={secs}")]);
        }

        if let Some(user) = &conn.user {
            args.extend(["-l".into(), user.clone()]);
        }
        if let Some(key) = &conn.identity_file {
            args.extend(["-i".into(), key.clone()]);
            args.extend(["-o".into(), "IdentitiesOnly=yes".into()]);
        }
        if let Some(port) = conn.port {
            args.extend(["-p".into(), port.to_string()]);
        }

        args.push("--".into());
        args.push(conn.hostname.clone());
        args.push(command.to_string());
        args
    }

    fn push_known_hosts(&self, args: &mut Vec<String>) {
        if let Some(path) = &self.options.known_hosts_path {
            let path = crate::config::paths::expand_tilde(std::path::Path::new(path));
            args.extend(["-o".into(), format!("UserKnownHostsFile={}", path.display())]);
        }
    }
}

impl RemoteExecutor for OpenSshExecutor {
    fn run(&self, conn: &ResolvedConnection, command: &str) -> Result<Vec<String>, HostError> {
        if self.options.host_key_policy == HostKeyPolicy::Insecure {
            tracing::warn!(
                "Host key verification disabled for {} (host_key_policy = insecure)",
                conn.alias
            );
        }

        let mut cmd = Command::new("ssh");
        cmd.args(self.ssh_args(conn, command));

        let mut session = SshSession::open(cmd, conn)?;
        session.collect()
    }
}

/// A running `ssh` child process, released on drop
struct SshSession {
    child: Child,
    alias: String,
    key_hint: Option<String>,
}

impl SshSession {
    fn open(mut cmd: Command, conn: &ResolvedConnection) -> Result<Self, HostError> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!("Spawning SSH session to {} ({})", conn.alias, conn.hostname);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HostError::SshSpawn("SSH not found. Install OpenSSH client.".to_string())
            } else {
                HostError::SshSpawn(e.to_string())
            }
        })?;

        Ok(Self {
            child,
            alias: conn.alias.clone(),
            key_hint: conn.identity_file.clone(),
        })
    }

    /// Read every stdout line, then wait for the remote command to finish
    fn collect(&mut self) -> Result<Vec<String>, HostError> {
        let stdout = self.child.stdout.take().ok_or_else(|| {
            HostError::ConnectionFailed("SSH stdout was not captured".to_string())
        })?;

        // Drain stderr on the side so a chatty remote can't fill the pipe
        let stderr_reader = self.child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let lines = read_lines(BufReader::new(stdout))
            .map_err(|e| HostError::ConnectionFailed(format!("Failed to read output: {e}")))?;

        let status = self
            .child
            .wait()
            .map_err(|e| HostError::ConnectionFailed(format!("Failed to wait for ssh: {e}")))?;

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(classify_failure(status, &stderr, self.key_hint.clone()));
        }

        tracing::debug!("Read {} lines from {}", lines.len(), self.alias);
        Ok(lines)
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            tracing::debug!("Terminating SSH session to {}", self.alias);
            if let Err(e) = self.child.kill() {
                // Process may have already exited
                tracing::debug!("SSH session kill result: {}", e);
            }
        }
        // Wait to reap the zombie process
        let _ = self.child.wait();
    }
}

/// Split output into lines, replacing invalid UTF-8 instead of failing
fn read_lines<R: BufRead>(mut reader: R) -> std::io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        lines.push(line.trim_end_matches(['\n', '\r']).to_string());
    }
    Ok(lines)
}

/// Turn a failed session's exit status and stderr into a host error
fn classify_failure(status: ExitStatus, stderr: &str, key_hint: Option<String>) -> HostError {
    if stderr.contains("Permission denied") || stderr.contains("Host key verification failed") {
        return HostError::AuthFailed { key_hint };
    }

    if stderr.contains("command not found") {
        return HostError::RemoteDockerUnavailable(
            "Docker is not installed on remote host".to_string(),
        );
    }

    let stderr = stderr.trim();
    if stderr.is_empty() {
        HostError::ConnectionFailed(format!("ssh exited with {status}"))
    } else {
        HostError::ConnectionFailed(stderr.to_string())
    }
}
