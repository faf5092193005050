//! Color utilities for CLI output
//!
//! Provides consistent color styling for container states.

use comfy_table::Color;

/// Pick a table color for a `docker ps` status string
///
/// - "Up ..." -> green (yellow when unhealthy or paused)
/// - "Restarting ..." / "Created" -> yellow
/// - "Exited ..." / "Dead" -> red
/// - other -> default
pub fn status_color(status: &str) -> Color {
    let lowercase = status.to_lowercase();
    if lowercase.starts_with("up") {
        if lowercase.contains("unhealthy") || lowercase.contains("paused") {
            Color::Yellow
        } else {
            Color::Green
        }
    } else if lowercase.starts_with("restarting") || lowercase.starts_with("created") {
        Color::Yellow
    } else if lowercase.starts_with("exited") || lowercase.starts_with("dead") {
        Color::Red
    } else {
        Color::Reset
    }
}
