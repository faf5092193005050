//! Per-host progress lines printed during an inventory run

use console::style;
use docklist_core::InventoryEvent;

/// Prints a styled line for each inventory event
///
/// In quiet mode only failures are shown.
pub struct ProgressPrinter {
    quiet: bool,
}

impl ProgressPrinter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn handle(&self, event: &InventoryEvent<'_>) {
        if let Some(line) = self.format(event) {
            println!("{line}");
        }
    }

    fn format(&self, event: &InventoryEvent<'_>) -> Option<String> {
        match event {
            InventoryEvent::Connecting {
                conn,
                auth,
                command,
            } => {
                if self.quiet {
                    return None;
                }
                let mut lines = vec![format!(
                    "{} {}",
                    style("Attempting to connect to host:").cyan(),
                    style(&conn.alias).bold()
                )];
                lines.push(format!("  {:<16} {}", style("Hostname:").dim(), conn.hostname));
                lines.push(format!(
                    "  {:<16} {}",
                    style("User:").dim(),
                    conn.user.as_deref().unwrap_or("-")
                ));
                lines.push(format!(
                    "  {:<16} {}",
                    style("Key file:").dim(),
                    conn.identity_file.as_deref().unwrap_or("-")
                ));
                lines.push(format!("  {:<16} {}", style("Command:").dim(), command));
                lines.push(format!("  {}", style(auth.describe()).dim()));
                Some(lines.join("\n"))
            }
            InventoryEvent::LineRejected { host, rejected } => Some(format!(
                "  {} {} ({}): {}",
                style("Error decoding JSON from").yellow(),
                host,
                rejected.error,
                rejected.line
            )),
            InventoryEvent::HostCompleted { host, containers } => {
                if self.quiet {
                    return None;
                }
                Some(format!(
                    "  {} {} container(s) on {}",
                    style("✓").green().bold(),
                    containers,
                    host
                ))
            }
            InventoryEvent::HostFailed { host, error } => Some(format!(
                "{} Error connecting to {}: {}",
                style("✗").red().bold(),
                style(host).yellow(),
                error
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docklist_core::HostError;
    use docklist_core::host::{AuthMode, ResolvedConnection};
    use docklist_core::inventory::RejectedLine;

    #[test]
    fn connecting_lists_resolved_settings() {
        let conn = ResolvedConnection {
            alias: "web-1".to_string(),
            hostname: "10.0.0.5".to_string(),
            user: Some("deploy".to_string()),
            identity_file: None,
            port: None,
        };
        let event = InventoryEvent::Connecting {
            conn: &conn,
            auth: AuthMode::UserOnly,
            command: "sudo docker ps",
        };

        let line = ProgressPrinter::new(false).format(&event).unwrap();
        assert!(line.contains("web-1"));
        assert!(line.contains("10.0.0.5"));
        assert!(line.contains("deploy"));
        assert!(line.contains("user only"));
        assert!(ProgressPrinter::new(true).format(&event).is_none());
    }

    #[test]
    fn failures_are_shown_even_when_quiet() {
        let error = HostError::ConnectionFailed("Connection refused".to_string());
        let event = InventoryEvent::HostFailed {
            host: "b",
            error: &error,
        };

        let line = ProgressPrinter::new(true).format(&event).unwrap();
        assert!(line.contains("Error connecting to"));
        assert!(line.contains('b'));
        assert!(line.contains("Connection refused"));
    }

    #[test]
    fn rejected_line_names_the_line() {
        let rejected = RejectedLine {
            line: "{oops".to_string(),
            error: "key must be a string".to_string(),
        };
        let event = InventoryEvent::LineRejected {
            host: "a",
            rejected: &rejected,
        };

        let line = ProgressPrinter::new(false).format(&event).unwrap();
        assert!(line.contains("{oops"));
    }
}
