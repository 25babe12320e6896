//! Sitemap generation configuration.
//!
//! ```toml
//! [sitemap]
//! enable = true
//! path = "sitemap.xml"                  # Relative to [server].public
//! public_url = "https://example.com"    # Defaults to the local server origin
//! max_age_secs = 3600                   # Skip regeneration while younger than this
//! at = "05:00"                          # Daily regeneration time
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::jobs::DailyAt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub enable: bool,
    pub path: PathBuf,
    pub public_url: Option<String>,
    pub max_age_secs: u64,
    pub at: String,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enable: true,
            path: "sitemap.xml".into(),
            public_url: None,
            max_age_secs: 3600,
            at: "05:00".into(),
        }
    }
}

impl SitemapConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if DailyAt::parse(&self.at).is_none() {
            diag.error_with_hint(
                FieldPath::new("sitemap.at"),
                format!("invalid time `{}`", self.at),
                "use 24-hour HH:MM, e.g. \"05:00\"",
            );
        }

        if let Some(url) = &self.public_url
            && url::Url::parse(url).is_err()
        {
            diag.error(
                FieldPath::new("sitemap.public_url"),
                format!("`{url}` is not an absolute URL"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_sitemap_defaults() {
        let config = test_parse_config("");
        assert!(config.sitemap.enable);
        assert_eq!(config.sitemap.path, PathBuf::from("sitemap.xml"));
        assert_eq!(config.sitemap.max_age_secs, 3600);
        assert!(config.sitemap.public_url.is_none());
    }

    #[test]
    fn test_validate_time_and_url() {
        let sitemap = SitemapConfig {
            at: "5am".into(),
            public_url: Some("example.com".into()),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        sitemap.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}
