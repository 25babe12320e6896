//! Sitewire: server-rendered site runtime with content-hashed asset URLs.

mod asset;
mod cli;
mod config;
mod jobs;
mod logger;
mod server;
mod utils;
mod view;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    server::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Serve { .. } => server::serve(Arc::new(config)),
        Commands::Hashes { pretty } => cli::print_hashes(&config, *pretty),
        Commands::Sitemap { force } => cli::run_sitemap(&config, *force),
        Commands::Backup => cli::run_backup(&config),
        Commands::Restore { name } => cli::run_restore(&config, name),
    }
}
