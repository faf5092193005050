//! The inventory pass
//!
//! Visits each configured host in order, one at a time: resolve, connect,
//! list containers, parse, append. A failing host is reported and skipped.

use super::record::{RejectedLine, parse_docker_output};
use super::report::AggregateReport;
use crate::config::Config;
use crate::host::{
    AuthMode, HostError, RemoteExecutor, ResolvedConnection, SshConfigResolver, effective_user,
    remote_command,
};

/// Progress notifications emitted during a run
#[derive(Debug)]
pub enum InventoryEvent<'a> {
    /// About to open a session to a host
    Connecting {
        conn: &'a ResolvedConnection,
        auth: AuthMode,
        command: &'a str,
    },
    /// A line of output could not be decoded
    LineRejected {
        host: &'a str,
        rejected: &'a RejectedLine,
    },
    /// A host answered; `containers` records were kept
    HostCompleted { host: &'a str, containers: usize },
    /// A host could not be queried and contributes nothing
    HostFailed { host: &'a str, error: &'a HostError },
}

/// A host that was skipped and why
#[derive(Debug)]
pub struct HostFailure {
    pub host: String,
    pub error: HostError,
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct InventoryOutcome {
    pub report: AggregateReport,
    /// Hosts that answered, in order
    pub succeeded: Vec<String>,
    /// Hosts that were skipped, in order
    pub failed: Vec<HostFailure>,
}

/// Query every configured host and aggregate their containers
///
/// Only per-host and per-line problems can happen here and neither aborts
/// the run; `on_event` sees each of them as it happens.
pub fn run_inventory<E, F>(
    config: &Config,
    resolver: &SshConfigResolver,
    executor: &E,
    mut on_event: F,
) -> InventoryOutcome
where
    E: RemoteExecutor + ?Sized,
    F: FnMut(InventoryEvent<'_>),
{
    let mut outcome = InventoryOutcome::default();

    for host in &config.hosts {
        let conn = resolver.resolve(host, &config.ssh_key_path);
        let command = remote_command(&effective_user(&conn));

        tracing::info!("Querying {} ({})", host, conn.display_settings());
        on_event(InventoryEvent::Connecting {
            conn: &conn,
            auth: AuthMode::for_connection(&conn),
            command: &command,
        });

        let lines = match executor.run(&conn, &command) {
            Ok(lines) => lines,
            Err(error) => {
                tracing::debug!("Error connecting to {}: {}", host, error);
                on_event(InventoryEvent::HostFailed {
                    host,
                    error: &error,
                });
                outcome.failed.push(HostFailure {
                    host: host.clone(),
                    error,
                });
                continue;
            }
        };

        let parsed = parse_docker_output(&lines);
        for rejected in &parsed.rejected {
            on_event(InventoryEvent::LineRejected { host, rejected });
        }

        on_event(InventoryEvent::HostCompleted {
            host,
            containers: parsed.records.len(),
        });
        outcome.report.extend_host(host, parsed.records);
        outcome.succeeded.push(host.clone());
    }

    tracing::info!(
        "Inventory complete: {} containers from {} hosts ({} failed)",
        outcome.report.len(),
        outcome.succeeded.len(),
        outcome.failed.len()
    );
    outcome
}
