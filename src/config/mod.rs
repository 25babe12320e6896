//! Site configuration management for `site.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! ├── error          # ConfigError, diagnostics
//! ├── util           # Config file lookup
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Precedence
//!
//! defaults < `site.toml` < environment < command-line flags
//!
//! | Variable       | Overrides                 |
//! |----------------|---------------------------|
//! | `PORT`         | `server.port`             |
//! | `DATABASE_URL` | `database.url`            |
//! | `PUBLIC_URL`   | `sitemap.public_url`      |
//! | `SITE_ENV`     | `server.production`       |

mod error;
pub mod section;
mod util;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use section::{
    AssetsConfig, BackupConfig, DatabaseConfig, KeyStyle, PageRoute, ServerConfig, SitemapConfig,
};

use section::{default_pages, validate_pages};
use util::find_config_file;

use crate::{
    cli::{Cli, Commands},
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing site.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub sitemap: SitemapConfig,

    #[serde(default)]
    pub backup: BackupConfig,

    #[serde(default = "default_pages")]
    pub pages: Vec<PageRoute>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            server: ServerConfig::default(),
            assets: AssetsConfig::default(),
            database: DatabaseConfig::default(),
            sitemap: SitemapConfig::default(),
            backup: BackupConfig::default(),
            pages: default_pages(),
        }
    }
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file; without one, the
    /// current directory is the root and defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        crate::logger::set_verbose(cli.verbose);

        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = normalize_path(&path);
                config
            }
            None => {
                log!("config"; "{} not found, using defaults", cli.config.display());
                let mut config = Self::default();
                config.config_path = cwd.join(&cli.config);
                config
            }
        };

        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_command_options(cli);
        config.normalize_paths(&root);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "ignoring unknown fields in {}: {}", name, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Absolute origin used in sitemap URLs.
    pub fn public_url(&self) -> String {
        self.sitemap
            .public_url
            .clone()
            .unwrap_or_else(|| self.server.local_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Absolute path of the generated sitemap.
    pub fn sitemap_path(&self) -> PathBuf {
        self.server.public.join(&self.sitemap.path)
    }

    // ========================================================================
    // overrides
    // ========================================================================

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::Env("PORT", format!("`{port}`: {e}")))?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(url) = lookup("PUBLIC_URL") {
            self.sitemap.public_url = Some(url);
        }
        if let Some(env) = lookup("SITE_ENV") {
            self.server.production = match env.trim() {
                "production" => true,
                "development" | "" => false,
                other => {
                    return Err(ConfigError::Env(
                        "SITE_ENV",
                        format!("`{other}`, expected production or development"),
                    ));
                }
            };
        }
        Ok(())
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Commands::Serve {
            interface,
            port,
            production,
            watch,
        } = &cli.command
        {
            Self::update_option(&mut self.server.interface, interface.as_ref());
            Self::update_option(&mut self.server.port, port.as_ref());
            Self::update_option(&mut self.assets.watch, watch.as_ref());
            if *production {
                self.server.production = true;
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve all configured paths against the root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.set_root(&root);

        self.server.public = normalize_path(&root.join(&self.server.public));
        self.server.views = normalize_path(&root.join(&self.server.views));

        let expanded = shellexpand::tilde(&self.backup.dir.to_string_lossy()).into_owned();
        self.backup.dir = normalize_path(&root.join(expanded));
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting every error before failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.server.workers == 0 {
            diag.error(FieldPath::new("server.workers"), "must be at least 1");
        }
        self.assets.validate(&mut diag);
        self.sitemap.validate(&mut diag);
        self.backup.validate(&mut diag);
        validate_pages(&self.pages, &mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rustc_hash::FxHashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result: Result<SiteConfig, _> = toml::from_str("[server\nport = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.assets.folders, vec!["css", "js"]);
        assert_eq!(config.pages.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[server]\nport = 1\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.server.port, 1);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SiteConfig::default();
        config
            .apply_env(env(&[
                ("PORT", "9000"),
                ("DATABASE_URL", "mongodb://db:27017/blog"),
                ("PUBLIC_URL", "https://example.com/"),
                ("SITE_ENV", "production"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.name(), "blog");
        assert!(config.server.production);
        assert_eq!(config.public_url(), "https://example.com");
    }

    #[test]
    fn test_env_invalid_port() {
        let mut config = SiteConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env("PORT", _)));
    }

    #[test]
    fn test_env_invalid_mode() {
        let mut config = SiteConfig::default();
        assert!(config.apply_env(env(&[("SITE_ENV", "staging")])).is_err());
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = SiteConfig::default();
        config.apply_env(env(&[("PORT", "9000")])).unwrap();

        let cli =
            Cli::try_parse_from(["sitewire", "serve", "-p", "7000", "--watch=false"]).unwrap();
        config.apply_command_options(&cli);

        assert_eq!(config.server.port, 7000);
        assert!(!config.assets.watch);
        assert!(!config.server.production);
    }

    #[test]
    fn test_public_url_falls_back_to_local() {
        let config = SiteConfig::default();
        assert_eq!(config.public_url(), "http://127.0.0.1:8888");
    }

    #[test]
    fn test_normalize_paths_relative_to_root() {
        let dir = TempDir::new().unwrap();
        let mut config =
            test_parse_config("[server]\npublic = \"static\"\n[backup]\ndir = \"dumps\"");
        config.normalize_paths(dir.path());

        let root = normalize_path(dir.path());
        assert_eq!(config.root, root);
        assert_eq!(config.server.public, root.join("static"));
        assert_eq!(config.server.views, root.join("views"));
        assert_eq!(config.backup.dir, root.join("dumps"));
        assert_eq!(config.sitemap_path(), root.join("static/sitemap.xml"));
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let config = test_parse_config(
            "[server]\nworkers = 0\n[assets]\npattern = \"(\"\n[backup]\nat = \"4\"\n[[pages]]\npath = \"x\"\nview = \"x\"",
        );
        match config.validate() {
            Err(ConfigError::Diagnostics(diag)) => assert_eq!(diag.len(), 4),
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }
}
