//! Configuration section definitions.
//!
//! Each module corresponds to a section in `site.toml`:
//!
//! | Module     | TOML Section   | Purpose                              |
//! |------------|----------------|--------------------------------------|
//! | `server`   | `[server]`     | Bind address, mode, static/view dirs |
//! | `assets`   | `[assets]`     | Cache-busted asset folders           |
//! | `database` | `[database]`   | Database URL                         |
//! | `sitemap`  | `[sitemap]`    | sitemap.xml generation               |
//! | `backup`   | `[backup]`     | Scheduled database dumps             |
//! | `pages`    | `[[pages]]`    | Page routes                          |

mod assets;
mod backup;
mod database;
mod pages;
mod server;
mod sitemap;

pub use assets::{AssetsConfig, KeyStyle};
pub use backup::BackupConfig;
pub use database::DatabaseConfig;
pub use pages::{PageRoute, default_pages, validate_pages};
pub use server::{DEVELOPMENT_MAX_AGE, PRODUCTION_MAX_AGE, ServerConfig};
pub use sitemap::SitemapConfig;
