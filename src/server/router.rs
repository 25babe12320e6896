//! Page routes from `[[pages]]`.

use rustc_hash::FxHashMap;

use crate::config::PageRoute;

/// Maps request paths to view names. A trailing slash is ignored, so
/// `/about/` matches `/about`.
#[derive(Debug, Default)]
pub struct Router {
    routes: FxHashMap<String, String>,
}

impl Router {
    /// Later routes for the same path replace earlier ones.
    pub fn new(pages: &[PageRoute]) -> Self {
        let routes = pages
            .iter()
            .map(|page| (normalize(&page.path).to_string(), page.view.clone()))
            .collect();
        Self { routes }
    }

    /// View for `path`, if any.
    pub fn find(&self, path: &str) -> Option<&str> {
        self.routes.get(normalize(path)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
