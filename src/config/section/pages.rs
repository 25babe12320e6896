//! `[[pages]]` route table.
//!
//! ```toml
//! [[pages]]
//! path = "/"
//! view = "index"
//!
//! [[pages]]
//! path = "/about"
//! view = "about"
//! sitemap = true
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// A GET route rendering a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRoute {
    pub path: String,
    pub view: String,
    /// List in sitemap.xml.
    #[serde(default = "default_true")]
    pub sitemap: bool,
}

const fn default_true() -> bool {
    true
}

impl PageRoute {
    pub fn new(path: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            view: view.into(),
            sitemap: true,
        }
    }
}

pub fn default_pages() -> Vec<PageRoute> {
    vec![PageRoute::new("/", "index")]
}

pub fn validate_pages(pages: &[PageRoute], diag: &mut ConfigDiagnostics) {
    for page in pages {
        if !page.path.starts_with('/') || page.path.contains(['?', '#']) {
            diag.error_with_hint(
                FieldPath::new("pages.path"),
                format!("`{}` is not an absolute path", page.path),
                "page paths look like \"/about\"",
            );
        }
        if page.view.is_empty() || page.view.contains("..") {
            diag.error(
                FieldPath::new("pages.view"),
                format!("`{}` is not a view name", page.view),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_default_pages() {
        let config = test_parse_config("");
        assert_eq!(config.pages, vec![PageRoute::new("/", "index")]);
    }

    #[test]
    fn test_pages_table() {
        let config = test_parse_config(
            "[[pages]]\npath = \"/\"\nview = \"index\"\n\n[[pages]]\npath = \"/login\"\nview = \"login\"\nsitemap = false",
        );
        assert_eq!(config.pages.len(), 2);
        assert!(!config.pages[1].sitemap);
    }

    #[test]
    fn test_validate_pages() {
        let pages = vec![
            PageRoute::new("about", "about"),
            PageRoute::new("/x?y=1", "x"),
            PageRoute::new("/ok", "../secret"),
        ];
        let mut diag = ConfigDiagnostics::new();
        validate_pages(&pages, &mut diag);
        assert_eq!(diag.len(), 3);
    }
}
