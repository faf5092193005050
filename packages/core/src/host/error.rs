//! Host-specific error types
//!
//! Errors that can occur while resolving or querying a remote host.

use thiserror::Error;

/// Errors that can occur during host operations
#[derive(Error, Debug)]
pub enum HostError {
    /// Failed to read or parse the SSH client config
    #[error("Failed to read SSH config: {0}")]
    SshConfigRead(String),

    /// Failed to spawn SSH process
    #[error("Failed to spawn SSH: {0}")]
    SshSpawn(String),

    /// SSH connection failed or the remote command exited non-zero
    #[error("SSH connection failed: {0}")]
    ConnectionFailed(String),

    /// SSH authentication or host key verification failed
    #[error("SSH authentication failed (key: {})", .key_hint.as_deref().unwrap_or("default"))]
    AuthFailed {
        key_hint: Option<String>,
    },

    /// Remote Docker not available
    #[error("Docker not available on remote host: {0}")]
    RemoteDockerUnavailable(String),
}
