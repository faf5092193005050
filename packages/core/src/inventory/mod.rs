//! Container inventory
//!
//! Turns raw `docker ps` output from each host into one ordered report:
//! - Line-by-line record decoding
//! - Column selection and projection
//! - Aggregation, snapshot writing and the per-host run loop

mod fields;
mod record;
mod report;
mod run;

pub use fields::{Field, NOT_AVAILABLE, enabled_fields, project_row};
pub use record::{ContainerRecord, ParsedOutput, RejectedLine, parse_docker_output};
pub use report::{AggregateReport, HostRecord, ReportError, TableView};
pub use run::{HostFailure, InventoryEvent, InventoryOutcome, run_inventory};
