//! Output utilities for the CLI
//!
//! Table rendering for the container inventory, progress lines for each
//! host visited, and color helpers for container states.

pub mod colors;
pub mod progress;
pub mod table;

pub use progress::ProgressPrinter;
pub use table::render_table;
