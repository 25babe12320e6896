use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::AssetChange;
use super::debouncer::Debouncer;
use crate::asset::error::AssetError;
use crate::asset::index::{IndexSpec, Scan, build_index};
use crate::asset::store::AssetStore;
use crate::logger::{status_error, status_success};
use crate::{debug, log};

/// Default quiet window before a burst of changes is rebuilt.
pub const DEBOUNCE_MS: u64 = 150;

/// Consumes change events and publishes fresh indexes.
///
/// The only writer of the [`AssetStore`].
pub struct Rebuilder {
    spec: Arc<IndexSpec>,
    store: AssetStore,
    events: mpsc::Receiver<AssetChange>,
    debouncer: Debouncer,
}

impl Rebuilder {
    pub fn new(
        spec: Arc<IndexSpec>,
        store: AssetStore,
        events: mpsc::Receiver<AssetChange>,
    ) -> Self {
        Self::with_debounce(spec, store, events, Duration::from_millis(DEBOUNCE_MS))
    }

    pub fn with_debounce(
        spec: Arc<IndexSpec>,
        store: AssetStore,
        events: mpsc::Receiver<AssetChange>,
        window: Duration,
    ) -> Self {
        Self {
            spec,
            store,
            events,
            debouncer: Debouncer::new(window),
        }
    }

    /// Run until every sender is dropped.
    ///
    /// Changes still pending when the channel closes are rebuilt once more
    /// before returning.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                event = self.events.recv() => match event {
                    Some(AssetChange { path }) => {
                        debug!("watch"; "changed: {}", path.display());
                        self.debouncer.add(path);
                    }
                    None => {
                        if let Some(paths) = self.debouncer.flush() {
                            self.rebuild(&paths).await;
                        }
                        break;
                    }
                },
                _ = tokio::time::sleep(self.debouncer.sleep_duration()) => {
                    if let Some(paths) = self.debouncer.take_if_ready() {
                        self.rebuild(&paths).await;
                    }
                }
            }
        }
    }

    /// Full rebuild. Folders that cannot be listed are left out of the new
    /// index; if the task itself fails the previous index stays published.
    async fn rebuild(&self, changed: &[std::path::PathBuf]) {
        match rebuild_blocking(Arc::clone(&self.spec)).await {
            Ok(scan) if !scan.unlisted.is_empty() => {
                let detail = scan
                    .unlisted
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n");
                self.store.publish(scan.index);
                status_error("asset folder unavailable, its hashes were dropped", &detail);
            }
            Ok(scan) => {
                let count = scan.index.len();
                self.store.publish(scan.index);
                status_success(&format!(
                    "change detected in {} file{}, {} asset hash{} regenerated",
                    changed.len(),
                    if changed.len() == 1 { "" } else { "s" },
                    count,
                    if count == 1 { "" } else { "es" },
                ));
            }
            Err(e) => {
                status_error("asset rebuild failed, keeping previous hashes", &e.to_string());
            }
        }
    }
}

async fn rebuild_blocking(spec: Arc<IndexSpec>) -> Result<Scan, AssetError> {
    tokio::task::spawn_blocking(move || build_index(&spec))
        .await
        .map_err(|e| {
            log!("watch"; "rebuild task panicked: {}", e);
            AssetError::TaskAborted
        })
}
