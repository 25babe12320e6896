//! Background jobs: sitemap generation and database backups, run on a
//! daily schedule while serving or once from the CLI.

mod backup;
mod error;
mod schedule;
mod sitemap;

pub use backup::{backup_now, dump_dir_name, prune_dumps, restore};
pub use error::JobError;
pub use schedule::{DailyAt, spawn_daily};
pub use sitemap::{SitemapOutcome, build_sitemap};
