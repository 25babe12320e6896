//! Command-line interface module.

mod args;

pub use args::{Cli, Commands};

use anyhow::{Context, Result};

use crate::asset::{self, build_index};
use crate::config::SiteConfig;
use crate::jobs::{self, SitemapOutcome};
use crate::log;

/// `hashes`: scan once and print the index as JSON.
pub fn print_hashes(config: &SiteConfig, pretty: bool) -> Result<()> {
    let spec = asset::index_spec(config)?;
    let scan = build_index(&spec).complete()?;

    let json = if pretty {
        serde_json::to_string_pretty(&scan.index)?
    } else {
        serde_json::to_string(&scan.index)?
    };
    println!("{json}");

    if !scan.collisions.is_empty() {
        log!("assets"; "{} key collision(s), last folder wins", scan.collisions.len());
    }
    Ok(())
}

/// `sitemap [--force]`
pub fn run_sitemap(config: &SiteConfig, force: bool) -> Result<()> {
    match jobs::build_sitemap(config, force).context("sitemap generation failed")? {
        SitemapOutcome::Written(_) => {}
        SitemapOutcome::Fresh => log!("sitemap"; "still fresh, use --force to regenerate"),
        SitemapOutcome::Disabled => log!("sitemap"; "disabled in [sitemap]"),
    }
    Ok(())
}

/// `backup`
pub fn run_backup(config: &SiteConfig) -> Result<()> {
    let out = jobs::backup_now(config).context("backup failed")?;
    log!("backup"; "done: {}", out.display());
    Ok(())
}

/// `restore <NAME>`
pub fn run_restore(config: &SiteConfig, name: &str) -> Result<()> {
    let dir = jobs::restore(config, name).context("restore failed")?;
    log!("backup"; "restored {}", dir.display());
    Ok(())
}
