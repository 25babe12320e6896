//! Asset index: key → versioned URL.
//!
//! Built by scanning the configured folders under the static root. A build
//! always produces a complete index; it is never patched in place.
//!
//! ```text
//! public/css/main.css  →  "main.css" => "/css/main.css?v=<digest>"
//! public/js/app.js     →  "app.js"   => "/js/app.js?v=<digest>"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use serde::Serialize;

use super::digest::{Digest, digest_file};
use super::error::AssetError;
use crate::config::KeyStyle;
use crate::log;

/// Characters escaped in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// One hashed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub folder: String,
    pub filename: String,
    pub digest: Digest,
}

impl AssetRecord {
    /// Browser URL with the digest as a cache-busting query parameter.
    ///
    /// Folder and file name are percent-encoded so the URL maps back to
    /// the file.
    pub fn url(&self) -> String {
        format!(
            "/{}/{}?v={}",
            utf8_percent_encode(&self.folder, PATH_SEGMENT),
            utf8_percent_encode(&self.filename, PATH_SEGMENT),
            self.digest
        )
    }

    pub fn key(&self, style: KeyStyle) -> String {
        match style {
            KeyStyle::Flat => self.filename.clone(),
            KeyStyle::Qualified => format!("{}/{}", self.folder, self.filename),
        }
    }
}

/// Immutable mapping from asset key to versioned URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssetIndex {
    urls: BTreeMap<String, String>,
}

impl AssetIndex {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.urls.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl FromIterator<(String, String)> for AssetIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

/// What to scan and how to key it.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    /// Static root (e.g. `public/`).
    pub root: PathBuf,
    /// Sub-folders of `root`, processed in order.
    pub folders: Vec<String>,
    /// File name filter.
    pub pattern: Regex,
    pub keys: KeyStyle,
}

impl IndexSpec {
    pub fn new(
        root: impl Into<PathBuf>,
        folders: Vec<String>,
        pattern: &str,
        keys: KeyStyle,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            root: root.into(),
            folders,
            pattern: Regex::new(pattern)?,
            keys,
        })
    }

    pub fn folder_paths(&self) -> Vec<PathBuf> {
        self.folders.iter().map(|f| self.root.join(f)).collect()
    }
}

/// Result of one full scan.
#[derive(Debug)]
pub struct Scan {
    pub index: AssetIndex,
    /// Files that matched but could not be read.
    pub skipped: Vec<PathBuf>,
    /// Keys written more than once (flat keying only).
    pub collisions: Vec<String>,
    /// Folders that could not be listed; their assets are absent.
    pub unlisted: Vec<AssetError>,
}

impl Scan {
    /// Fail on the first folder that could not be listed.
    pub fn complete(mut self) -> Result<Self, AssetError> {
        if self.unlisted.is_empty() {
            Ok(self)
        } else {
            Err(self.unlisted.swap_remove(0))
        }
    }
}

/// Scan every configured folder and build a fresh index.
///
/// Unreadable files are skipped with a warning. A folder that cannot be
/// listed contributes nothing and is recorded in [`Scan::unlisted`]; the
/// other folders are still indexed.
pub fn build_index(spec: &IndexSpec) -> Scan {
    let mut urls = BTreeMap::new();
    let mut skipped = Vec::new();
    let mut collisions = Vec::new();
    let mut unlisted = Vec::new();

    for folder in &spec.folders {
        let folder_path = spec.root.join(folder);
        let filenames = match list_matching(&folder_path, &spec.pattern) {
            Ok(names) => names,
            Err(e) => {
                log!("assets"; "{}", e);
                unlisted.push(e);
                continue;
            }
        };

        for filename in filenames {
            let path = folder_path.join(&filename);
            let digest = match digest_file(&path) {
                Ok(digest) => digest,
                Err(e) => {
                    log!("assets"; "skipping {}: {}", path.display(), e);
                    skipped.push(path);
                    continue;
                }
            };

            let record = AssetRecord {
                folder: folder.clone(),
                filename,
                digest,
            };
            let key = record.key(spec.keys);
            let url = record.url();

            // Last folder in configured order wins
            if let Some(previous) = urls.insert(key.clone(), url) {
                log!("assets"; "`{}` in {}/ replaces {}", key, folder, previous);
                collisions.push(key);
            }
        }
    }

    Scan {
        index: AssetIndex { urls },
        skipped,
        collisions,
        unlisted,
    }
}

/// Sorted names of regular files in `dir` matching `pattern`.
fn list_matching(dir: &Path, pattern: &Regex) -> Result<Vec<String>, AssetError> {
    let entries = fs::read_dir(dir).map_err(|e| AssetError::ListDir(dir.to_path_buf(), e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AssetError::ListDir(dir.to_path_buf(), e))?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if pattern.is_match(&name) && entry.path().is_file() {
            names.push(name);
        }
    }

    names.sort_unstable();
    Ok(names)
}
