//! View rendering.
//!
//! # Module Structure
//!
//! ```text
//! view/
//! ├── context    # RenderContext (locals + hashes)
//! ├── template   # {{ expr }} placeholder templates
//! ├── error      # ViewError
//! └── fallback/  # built-in 404 and error pages
//! ```
//!
//! `FileViews` loads `<views>/<name>.html`. The `404` and `error` views fall
//! back to built-in pages when the site does not provide them.

mod context;
mod error;
mod template;

pub use context::RenderContext;
pub use error::ViewError;
pub use template::Template;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// View shown for unmatched routes.
pub const NOT_FOUND_VIEW: &str = "404";
/// View shown when a handler fails.
pub const ERROR_VIEW: &str = "error";

const FALLBACK_404: &str = include_str!("fallback/404.html");
const FALLBACK_ERROR: &str = include_str!("fallback/error.html");

/// Renders a named view with a context.
pub trait ViewEngine: Send + Sync {
    fn render(&self, name: &str, ctx: &RenderContext) -> Result<String, ViewError>;
}

/// Views read from `<dir>/<name>.html`.
///
/// With `cache` set, each view is parsed once; otherwise it is re-read on
/// every render so edits show up immediately.
pub struct FileViews {
    dir: PathBuf,
    cache: Option<RwLock<FxHashMap<String, Arc<Template>>>>,
}

impl FileViews {
    pub fn new(dir: impl Into<PathBuf>, cache: bool) -> Self {
        Self {
            dir: dir.into(),
            cache: cache.then(|| RwLock::new(FxHashMap::default())),
        }
    }

    fn load(&self, name: &str) -> Result<Arc<Template>, ViewError> {
        if let Some(cache) = &self.cache
            && let Some(template) = cache.read().get(name)
        {
            return Ok(Arc::clone(template));
        }

        let template = Arc::new(Template::parse(&self.read_source(name)?));

        if let Some(cache) = &self.cache {
            cache
                .write()
                .insert(name.to_string(), Arc::clone(&template));
        }
        Ok(template)
    }

    fn read_source(&self, name: &str) -> Result<String, ViewError> {
        if !is_view_name(name) {
            return Err(ViewError::NotFound(name.to_string()));
        }

        let path = self.dir.join(format!("{name}.html"));
        match fs::read_to_string(&path) {
            Ok(source) => Ok(source),
            Err(e) if e.kind() == ErrorKind::NotFound => match name {
                NOT_FOUND_VIEW => Ok(FALLBACK_404.to_string()),
                ERROR_VIEW => Ok(FALLBACK_ERROR.to_string()),
                _ => Err(ViewError::NotFound(name.to_string())),
            },
            Err(e) => Err(ViewError::Io(path, e)),
        }
    }
}

impl ViewEngine for FileViews {
    fn render(&self, name: &str, ctx: &RenderContext) -> Result<String, ViewError> {
        Ok(self.load(name)?.render(ctx))
    }
}

/// Relative name without parent components, e.g. `index` or `blog/post`.
fn is_view_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('/')
        && !name.contains('\\')
        && name.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}
