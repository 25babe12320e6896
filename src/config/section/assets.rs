//! `[assets]` section configuration.
//!
//! Controls which static files get content-hashed URLs.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! folders = ["css", "js"]     # Sub-folders of [server].public, in order
//! pattern = '\.(css|js)$'     # File name filter (regex)
//! keys = "flat"               # "flat" (file name) or "qualified" (folder/file name)
//! watch = true                # Regenerate hashes when files change
//! ```
//!
//! With `keys = "flat"` two folders holding the same file name share one
//! entry, and the folder listed last wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// How asset index keys are formed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// `main.css`
    #[default]
    Flat,
    /// `css/main.css`
    Qualified,
}

/// Cache-busted asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub folders: Vec<String>,
    pub pattern: String,
    pub keys: KeyStyle,
    pub watch: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            folders: vec!["css".into(), "js".into()],
            pattern: r"\.(css|js)$".into(),
            keys: KeyStyle::Flat,
            watch: true,
        }
    }
}

impl AssetsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.folders.is_empty() {
            diag.error(FieldPath::new("assets.folders"), "must list at least one folder");
        }

        for folder in &self.folders {
            if folder.is_empty() || folder.contains(['/', '\\']) || folder == "." || folder == ".."
            {
                diag.error_with_hint(
                    FieldPath::new("assets.folders"),
                    format!("`{folder}` is not a plain folder name"),
                    "folders are direct children of [server].public, e.g. \"css\"",
                );
            }
        }

        if let Err(e) = Regex::new(&self.pattern) {
            diag.error(
                FieldPath::new("assets.pattern"),
                format!("invalid regex: {e}"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_assets_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.assets.folders, vec!["css", "js"]);
        assert_eq!(config.assets.keys, KeyStyle::Flat);
        assert!(config.assets.watch);
    }

    #[test]
    fn test_assets_qualified_keys() {
        let config = test_parse_config("[assets]\nkeys = \"qualified\"\nfolders = [\"styles\"]");
        assert_eq!(config.assets.keys, KeyStyle::Qualified);
        assert_eq!(config.assets.folders, vec!["styles"]);
    }

    #[test]
    fn test_unknown_key_style_rejected() {
        let result: Result<crate::config::SiteConfig, _> =
            toml::from_str("[assets]\nkeys = \"nested\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let assets = AssetsConfig {
            folders: vec!["css/vendor".into(), "..".into()],
            pattern: "(".into(),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        assets.validate(&mut diag);
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_validate_rejects_empty_folders() {
        let assets = AssetsConfig {
            folders: Vec::new(),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        assets.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }

    #[test]
    fn test_validate_default_is_clean() {
        let mut diag = ConfigDiagnostics::new();
        AssetsConfig::default().validate(&mut diag);
        assert!(diag.is_empty());
    }
}
