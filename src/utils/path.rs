//! Filesystem and URL path helpers.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_static` - request URL to a file under the static root

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a request URL to a regular file under `root`.
///
/// The query string is ignored, so `/css/main.css?v=abc` serves
/// `<root>/css/main.css`. Paths escaping `root` resolve to `None`.
pub fn resolve_static(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = url_path(url);
    if clean.is_empty() || clean.split('/').any(|seg| seg == "..") {
        return None;
    }

    let canonical = root.join(&clean).canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;

    (canonical.starts_with(&root_canonical) && canonical.is_file()).then_some(canonical)
}

/// Decoded path of a request URL without query string or fragment,
/// trimmed of surrounding slashes.
fn url_path(url: &str) -> String {
    let raw = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}
