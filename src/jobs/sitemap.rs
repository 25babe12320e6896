//! Sitemap generation.
//!
//! Lists every `[[pages]]` route marked `sitemap = true` under the public
//! URL, for search engine indexing.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2026-01-31</lastmod>
//!     <changefreq>weekly</changefreq>
//!   </url>
//! </urlset>
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Local;

use super::JobError;
use crate::config::{PageRoute, SiteConfig};
use crate::utils::html::escape_xml;
use crate::{debug, log};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const CHANGEFREQ: &str = "weekly";

/// Result of a sitemap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapOutcome {
    /// Written with this many URLs.
    Written(usize),
    /// Existing file is younger than `max_age_secs`.
    Fresh,
    /// `[sitemap].enable` is false.
    Disabled,
}

/// Regenerate the sitemap unless it is still fresh (or `force`).
pub fn build_sitemap(config: &SiteConfig, force: bool) -> Result<SitemapOutcome, JobError> {
    if !config.sitemap.enable {
        return Ok(SitemapOutcome::Disabled);
    }

    let path = config.sitemap_path();
    let max_age = Duration::from_secs(config.sitemap.max_age_secs);
    if !force && is_fresh(&path, max_age) {
        debug!("sitemap"; "{} is fresh, skipping", path.display());
        return Ok(SitemapOutcome::Fresh);
    }

    let lastmod = Local::now().format("%Y-%m-%d").to_string();
    let sitemap = Sitemap::from_pages(&config.public_url(), &config.pages, &lastmod);
    let count = sitemap.urls.len();
    write_atomic(&path, sitemap.into_xml().as_bytes())?;

    log!("sitemap"; "{} url(s) -> {}", count, path.display());
    Ok(SitemapOutcome::Written(count))
}

/// Whether `path` exists and was modified less than `max_age` ago.
fn is_fresh(path: &Path, max_age: Duration) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age < max_age)
}

/// Write via a sibling temp file and rename, so readers never see a
/// partial sitemap.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), JobError> {
    let write_err = |e| JobError::Write(path.to_path_buf(), e);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = path.with_extension("xml.tmp");
    fs::write(&tmp, bytes).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(e)
    })
}

struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    lastmod: String,
}

impl Sitemap {
    fn from_pages(base_url: &str, pages: &[PageRoute], lastmod: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let mut urls: Vec<UrlEntry> = Vec::with_capacity(pages.len());

        for page in pages.iter().filter(|p| p.sitemap) {
            let loc = format!("{base_url}{}", page.path);
            if urls.iter().any(|u| u.loc == loc) {
                continue;
            }
            urls.push(UrlEntry {
                loc,
                lastmod: lastmod.to_string(),
            });
        }

        Self { urls }
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.urls.len() * 128);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n    <lastmod>");
            xml.push_str(&entry.lastmod);
            xml.push_str("</lastmod>\n    <changefreq>");
            xml.push_str(CHANGEFREQ);
            xml.push_str("</changefreq>\n  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    fn site(dir: &TempDir, extra: &str) -> SiteConfig {
        let mut config = test_parse_config(&format!(
            "[sitemap]\npublic_url = \"https://example.com/\"\n{extra}\n\
             [[pages]]\npath = \"/\"\nview = \"index\"\n\
             [[pages]]\npath = \"/about\"\nview = \"about\"\n\
             [[pages]]\npath = \"/login\"\nview = \"login\"\nsitemap = false"
        ));
        config.server.public = dir.path().to_path_buf();
        config
    }

    #[test]
    fn test_sitemap_empty() {
        let xml = Sitemap { urls: vec![] }.into_xml();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        assert!(xml.trim_end().ends_with("</urlset>"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_from_pages_filters_and_dedups() {
        let pages = vec![
            PageRoute::new("/", "index"),
            PageRoute::new("/about", "about"),
            PageRoute::new("/about", "about-v2"),
            PageRoute {
                sitemap: false,
                ..PageRoute::new("/admin", "admin")
            },
        ];
        let sitemap = Sitemap::from_pages("https://example.com/", &pages, "2026-01-31");
        let locs: Vec<_> = sitemap.urls.iter().map(|u| u.loc.as_str()).collect();

        assert_eq!(locs, vec!["https://example.com/", "https://example.com/about"]);
    }

    #[test]
    fn test_xml_entries() {
        let pages = vec![PageRoute::new("/search?q=a&b", "search")];
        let xml = Sitemap::from_pages("https://example.com", &pages, "2026-01-31").into_xml();

        assert!(xml.contains("<loc>https://example.com/search?q=a&amp;b</loc>"));
        assert!(xml.contains("<lastmod>2026-01-31</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
    }

    #[test]
    fn test_build_writes_public_urls() {
        let dir = TempDir::new().unwrap();
        let config = site(&dir, "");

        let outcome = build_sitemap(&config, false).unwrap();
        assert_eq!(outcome, SitemapOutcome::Written(2));

        let xml = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        assert!(xml.contains("<loc>https://example.com/about</loc>"));
        assert!(!xml.contains("login"));
        assert!(!xml.contains("127.0.0.1"));
        assert!(!dir.path().join("sitemap.xml.tmp").exists());
    }

    #[test]
    fn test_fresh_sitemap_skipped_unless_forced() {
        let dir = TempDir::new().unwrap();
        let config = site(&dir, "");
        fs::write(dir.path().join("sitemap.xml"), "old").unwrap();

        assert_eq!(build_sitemap(&config, false).unwrap(), SitemapOutcome::Fresh);
        assert_eq!(fs::read_to_string(dir.path().join("sitemap.xml")).unwrap(), "old");

        assert_eq!(build_sitemap(&config, true).unwrap(), SitemapOutcome::Written(2));
    }

    #[test]
    fn test_stale_sitemap_regenerated() {
        let dir = TempDir::new().unwrap();
        let config = site(&dir, "max_age_secs = 0");
        fs::write(dir.path().join("sitemap.xml"), "old").unwrap();

        assert_eq!(build_sitemap(&config, false).unwrap(), SitemapOutcome::Written(2));
    }

    #[test]
    fn test_disabled() {
        let dir = TempDir::new().unwrap();
        let config = site(&dir, "enable = false");

        assert_eq!(build_sitemap(&config, true).unwrap(), SitemapOutcome::Disabled);
        assert!(!dir.path().join("sitemap.xml").exists());
    }
}
