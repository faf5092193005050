//! Host management module
//!
//! Provides functionality for reaching remote Docker hosts:
//! - SSH config resolution of host aliases
//! - Remote command execution over OpenSSH

mod error;
mod remote;
mod ssh_config;

// Public exports
pub use error::HostError;
pub use remote::{
    AuthMode, DOCKER_PS_COMMAND, OpenSshExecutor, RemoteExecutor, SshOptions, effective_user,
    remote_command,
};
pub use ssh_config::{ResolvedConnection, SshConfigResolver};
