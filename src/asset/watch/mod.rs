//! Asset folder watching.
//!
//! ```text
//! notify → AssetWatcher → mpsc<AssetChange> → Rebuilder (debounce) → build_index → AssetStore
//! ```
//!
//! The watcher only reports that something changed. Every batch of changes
//! triggers one full rebuild; which file changed is logged, never diffed.

mod debouncer;
mod rebuild;

pub use rebuild::Rebuilder;

use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::AssetError;
use crate::log;

/// Capacity of the change channel between notify and the rebuild task.
pub const CHANNEL_CAPACITY: usize = 256;

/// A path inside a watched folder was created, modified, renamed or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetChange {
    pub path: PathBuf,
}

/// Filesystem subscription for the asset folders.
///
/// Dropping it stops notifications.
pub struct AssetWatcher {
    _watcher: RecommendedWatcher,
}

impl AssetWatcher {
    /// Subscribe to every folder, failing if any cannot be watched.
    pub fn start(folders: &[PathBuf], tx: mpsc::Sender<AssetChange>) -> Result<Self, AssetError> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for path in changed_paths(&event) {
                        // A full queue already has a rebuild pending
                        let _ = tx.try_send(AssetChange { path });
                    }
                }
                Err(e) => log!("watch"; "notify error: {}", e),
            }
        })
        .map_err(|e| AssetError::Watch(PathBuf::new(), e))?;

        for folder in folders {
            watcher
                .watch(folder, RecursiveMode::NonRecursive)
                .map_err(|e| AssetError::Watch(folder.clone(), e))?;
        }

        Ok(Self { _watcher: watcher })
    }
}

/// Paths of a notify event that should trigger a rebuild.
fn changed_paths(event: &notify::Event) -> Vec<PathBuf> {
    use notify::EventKind;
    use notify::event::ModifyKind;

    match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => event.paths.clone(),
        // mtime/atime/chmod noise
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => event.paths.clone(),
        _ => Vec::new(),
    }
}
