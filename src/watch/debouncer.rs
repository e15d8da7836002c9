use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{EventKind, event::ModifyKind};
use rustc_hash::FxHashSet;

use crate::debug;

pub(super) const DEBOUNCE_MS: u64 = 300;

/// Idle wait between shutdown checks.
const IDLE_POLL_MS: u64 = 500;

/// Collects changed paths until the tree has been quiet for `DEBOUNCE_MS`.
#[derive(Debug, Default)]
pub(super) struct Debouncer {
    pub(super) changes: FxHashSet<PathBuf>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Record the paths of a create, modify or remove event.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // mtime/chmod noise
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            debug!("watch"; "{:?} {}", event.kind, path.display());
            self.changes.insert(path.clone());
            self.last_event = Some(Instant::now());
        }
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
            && !self.changes.is_empty()
    }

    /// Take the batch once it is ready.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        let mut batch: Vec<_> = std::mem::take(&mut self.changes).into_iter().collect();
        batch.sort();
        Some(batch)
    }

    /// Time until the pending batch could be ready.
    pub(super) fn sleep_duration(&self) -> Duration {
        match self.last_event {
            Some(t) => Duration::from_millis(DEBOUNCE_MS)
                .saturating_sub(t.elapsed())
                .max(Duration::from_millis(1)),
            None => Duration::from_millis(IDLE_POLL_MS),
        }
    }
}

/// Editor artifacts: backups, swap files, dotfiles.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name.starts_with(".#")
}
