//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Sitewire: server-rendered site runtime
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: site.toml)
    #[arg(short = 'C', long, global = true, default_value = "site.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the web server
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Production mode: long-lived static caching, no error details
        #[arg(long)]
        production: bool,

        /// Watch asset folders and regenerate hashes on change
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Print the asset index as JSON
    #[command(visible_alias = "h")]
    Hashes {
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Regenerate sitemap.xml
    Sitemap {
        /// Regenerate even if the current sitemap is still fresh
        #[arg(short, long)]
        force: bool,
    },

    /// Dump the database now and prune old dumps
    Backup,

    /// Restore a dump from the backup directory
    Restore {
        /// Dump directory name (e.g. site-2026-01-31)
        name: String,
    },
}
