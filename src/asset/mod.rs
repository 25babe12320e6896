//! Content-addressed static asset versioning (cache busting).
//!
//! Each watched file gets a URL carrying a digest of its bytes, e.g.
//! `/css/main.css?v=7815696ecbf1c96e6894b779456d330e`. When the bytes change,
//! the URL changes, so browsers and CDNs fetch the new file.

mod digest;
mod error;
mod index;
mod store;
pub mod watch;

pub use digest::{DIGEST_LEN, Digest, digest_file};
pub use error::AssetError;
pub use index::{AssetIndex, AssetRecord, IndexSpec, Scan, build_index};
pub use store::AssetStore;

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::log;

/// Index spec derived from `[assets]` and the static root.
pub fn index_spec(config: &SiteConfig) -> Result<IndexSpec> {
    IndexSpec::new(
        &config.server.public,
        config.assets.folders.clone(),
        &config.assets.pattern,
        config.assets.keys,
    )
    .with_context(|| format!("invalid asset pattern `{}`", config.assets.pattern))
}

/// Build the initial index. Any unlistable folder is a startup error.
pub fn init_store(spec: &IndexSpec) -> Result<AssetStore> {
    let scan = build_index(spec)
        .complete()
        .context("initial asset scan failed")?;

    log!("assets"; "{} hashed across {}", scan.index.len(), spec.folders.join(", "));
    if !scan.skipped.is_empty() {
        log!("assets"; "{} unreadable file(s) skipped", scan.skipped.len());
    }

    Ok(AssetStore::new(scan.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_store_from_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("css/main.css"), "body{}").unwrap();

        let mut config = SiteConfig::default();
        config.server.public = dir.path().to_path_buf();

        let spec = index_spec(&config).unwrap();
        let store = init_store(&spec).unwrap();
        assert_eq!(spec.folders, vec!["css".to_string(), "js".to_string()]);
        assert!(store.load().get("main.css").is_some());
    }

    #[test]
    fn test_init_store_requires_folders() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.server.public = dir.path().to_path_buf();

        let spec = index_spec(&config).unwrap();
        assert!(init_store(&spec).is_err());
    }
}
