//! Shared, atomically replaced asset index.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use super::index::AssetIndex;

/// Single-writer, many-reader holder of the current [`AssetIndex`].
///
/// Readers get an `Arc` snapshot and never block; the rebuild task replaces
/// the whole index with one pointer swap.
#[derive(Clone)]
pub struct AssetStore {
    inner: Arc<Inner>,
}

struct Inner {
    current: ArcSwap<AssetIndex>,
    generation: AtomicU64,
}

impl AssetStore {
    pub fn new(index: AssetIndex) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: ArcSwap::from_pointee(index),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<AssetIndex> {
        self.inner.current.load_full()
    }

    /// Replace the index wholesale.
    pub fn publish(&self, index: AssetIndex) {
        self.inner.current.store(Arc::new(index));
        self.inner.generation.fetch_add(1, Ordering::Release);
    }

    /// Number of publishes since creation.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &str)]) -> AssetIndex {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let store = AssetStore::new(index(&[("main.css", "/css/main.css?v=old")]));
        let before = store.load();

        store.publish(index(&[("main.css", "/css/main.css?v=new"), ("app.js", "/js/app.js?v=1")]));

        // Old reader still sees the complete old index
        assert_eq!(before.len(), 1);
        assert_eq!(before.get("main.css"), Some("/css/main.css?v=old"));

        let after = store.load();
        assert_eq!(after.len(), 2);
        assert_eq!(after.get("main.css"), Some("/css/main.css?v=new"));
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let store = AssetStore::new(AssetIndex::default());
        let reader = store.clone();

        store.publish(index(&[("app.js", "/js/app.js?v=1")]));

        assert_eq!(reader.load().get("app.js"), Some("/js/app.js?v=1"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_indexes() {
        let old = index(&[("a.css", "/css/a.css?v=1"), ("b.css", "/css/b.css?v=1")]);
        let new = index(&[("a.css", "/css/a.css?v=2"), ("b.css", "/css/b.css?v=2")]);
        let store = AssetStore::new(old.clone());

        std::thread::scope(|s| {
            for _ in 0..4 {
                let store = store.clone();
                let (old, new) = (old.clone(), new.clone());
                s.spawn(move || {
                    for _ in 0..1000 {
                        let seen = store.load();
                        assert!(*seen == old || *seen == new);
                    }
                });
            }
            for i in 0..200 {
                store.publish(if i % 2 == 0 { new.clone() } else { old.clone() });
            }
        });
    }
}
