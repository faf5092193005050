//! docklist - List running containers across SSH hosts
//!
//! This is the main entry point for the Rust CLI binary.

fn main() -> anyhow::Result<()> {
    docklist::run()
}
