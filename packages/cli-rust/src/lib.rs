//! docklist CLI - List running containers across a fleet of SSH hosts
//!
//! Loads `~/.config/docklist/conf.json`, visits every listed host in order,
//! prints a table of their containers and writes the full records to
//! `~/.config/docklist/docker_containers.json`.

mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use docklist_core::config::{self, get_snapshot_path, get_ssh_config_path};
use docklist_core::{
    OpenSshExecutor, SshConfigResolver, SshOptions, get_version_long, load_config_from,
    run_inventory,
};
use tracing_subscriber::EnvFilter;

use output::{ProgressPrinter, render_table};

/// List running Docker containers on every configured SSH host
#[derive(Parser)]
#[command(name = "docklist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "List running Docker containers across SSH hosts", long_about = None)]
struct Cli {
    /// Increase verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print the table and errors
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Read configuration from this file instead of ~/.config/docklist/conf.json
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the container snapshot here instead of ~/.config/docklist/docker_containers.json
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Configure color output
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => config::get_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?,
    };

    let config = match load_config_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            show_config_error(&e, &config_path);
            std::process::exit(1);
        }
    };

    let ssh_config_path = get_ssh_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine SSH config path"))?;

    let resolver = match SshConfigResolver::load(&ssh_config_path) {
        Ok(resolver) => resolver,
        Err(e) => {
            show_ssh_config_error(&e, &ssh_config_path);
            std::process::exit(1);
        }
    };

    let snapshot_path = match cli.output {
        Some(path) => path,
        None => get_snapshot_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine snapshot path"))?,
    };

    tracing::debug!("Snapshot will be written to {}", snapshot_path.display());

    if cli.verbose > 0 {
        eprintln!("{} docklist {}", style("[info]").cyan(), get_version_long());
        eprintln!(
            "{} Config: {}",
            style("[info]").cyan(),
            config_path.display()
        );
        eprintln!(
            "{} SSH config: {}",
            style("[info]").cyan(),
            ssh_config_path.display()
        );
    }

    let executor = OpenSshExecutor::new(SshOptions::from(&config));
    let progress = ProgressPrinter::new(cli.quiet);
    let outcome = run_inventory(&config, &resolver, &executor, |event| progress.handle(&event));

    let write_result = outcome.report.write_snapshot(&snapshot_path);

    let view = outcome.report.table(&config.fields);
    if !cli.quiet {
        println!();
    }
    println!("{}", render_table(&view));

    if !cli.quiet {
        println!();
        println!(
            "  {} {} container(s) from {} of {} host(s)",
            style("Found:").dim(),
            outcome.report.len(),
            outcome.succeeded.len(),
            config.hosts.len()
        );
        if !outcome.failed.is_empty() {
            let names: Vec<&str> = outcome.failed.iter().map(|f| f.host.as_str()).collect();
            println!(
                "  {} {}",
                style("Failed:").dim(),
                style(names.join(", ")).red()
            );
        }
        if write_result.is_ok() {
            println!(
                "  {} {}",
                style("Snapshot:").dim(),
                style(snapshot_path.display()).dim()
            );
        }
    }

    write_result
        .with_context(|| format!("Failed to save snapshot to {}", snapshot_path.display()))?;

    Ok(())
}

/// Set up tracing on stderr
///
/// `RUST_LOG` wins; otherwise `-v` raises the level from warn to info,
/// `-vv` to debug.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docklist={level},docklist_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Display a rich error for a missing or invalid config file
fn show_config_error(err: &anyhow::Error, config_path: &Path) {
    eprintln!("{} Configuration error", style("Error:").red().bold());
    eprintln!();
    eprintln!("  {:#}", err);
    eprintln!();
    eprintln!("  Config file: {}", style(config_path.display()).yellow());
    eprintln!();
    eprintln!(
        "  {} The file needs \"hosts\" (a list of SSH host aliases) and \"ssh_key_path\".",
        style("Tip:").cyan()
    );
    eprintln!(
        "  {} Optional: \"fields\" to pick table columns, \"host_key_policy\" (strict, accept-new, insecure).",
        style("Tip:").cyan()
    );
}

/// Display a rich error for a missing or invalid SSH config
fn show_ssh_config_error(err: &docklist_core::HostError, ssh_config_path: &Path) {
    eprintln!("{} SSH config error", style("Error:").red().bold());
    eprintln!();
    eprintln!("  {}", err);
    eprintln!();
    eprintln!("  SSH config: {}", style(ssh_config_path.display()).yellow());
    eprintln!();
    eprintln!(
        "  {} Point {} at another file to override the default location.",
        style("Tip:").cyan(),
        style(config::paths::SSH_CONFIG_PATH_ENV).green()
    );
}
