use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

/// Pure debouncer: collects changed paths and reports when a burst is over.
/// No filesystem access, no index state.
pub(super) struct Debouncer {
    window: Duration,
    pub(super) pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    pub(super) fn add(&mut self, path: PathBuf) {
        if is_temp_file(&path) {
            return;
        }
        self.pending.insert(path);
        self.last_event = Some(Instant::now());
    }

    pub(super) fn is_ready(&self) -> bool {
        match self.last_event {
            Some(last) => !self.pending.is_empty() && last.elapsed() >= self.window,
            None => false,
        }
    }

    /// Take the pending paths once the quiet window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        Some(paths)
    }

    /// Take whatever is pending regardless of timing.
    pub(super) fn flush(&mut self) -> Option<Vec<PathBuf>> {
        self.last_event = None;
        if self.pending.is_empty() {
            return None;
        }
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        Some(paths)
    }

    /// Sleep until the next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };
        self.window
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
