//! The file monitor (§4.9): watches search-location directories for
//! metadata changes and emits coalesced add/remove/change events after a
//! debounce window, so a burst of filesystem activity from one package
//! install becomes one reload rather than dozens.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{AppStreamError, Result};

/// "Changes have settled" window: once no new raw event arrives for this
/// long, pending changes are flushed (§4.9).
const DEBOUNCE_QUIET: Duration = Duration::from_millis(50);
/// Upper bound on how long a continuously-busy directory can delay a
/// flush, so a package manager that touches files in a slow drip still
/// gets noticed promptly.
const DEBOUNCE_MAX_WAIT: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

#[derive(Debug, Clone)]
pub struct Change {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// True for editor swap files, hidden dotfiles, and other paths that
/// aren't metadata even if they land inside a watched directory.
fn is_ignorable(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| {
            name.starts_with('.')
                || name.ends_with('~')
                || name.ends_with(".swp")
                || name.ends_with(".swx")
                || name.ends_with(".tmp")
        })
        .unwrap_or(true)
}

/// Coalesces a raw notify event stream into debounced, deduplicated
/// changes. Held in [`FileMonitor`] rather than exposed directly so the
/// debounce timing stays an implementation detail.
struct Debouncer {
    pending: HashMap<PathBuf, ChangeKind>,
    first_pending_at: Option<Instant>,
    last_event_at: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: HashMap::new(),
            first_pending_at: None,
            last_event_at: None,
        }
    }

    fn record(&mut self, path: PathBuf, kind: ChangeKind) {
        let now = Instant::now();
        self.last_event_at = Some(now);
        self.first_pending_at.get_or_insert(now);

        // Added-then-removed (or the reverse) within one debounce window
        // collapses to nothing; anything else keeps the latest kind, since
        // an atomic save shows up as create+rename (§4.9).
        match (self.pending.get(&path), kind) {
            (Some(ChangeKind::Added), ChangeKind::Removed) | (Some(ChangeKind::Removed), ChangeKind::Added) => {
                self.pending.remove(&path);
            }
            _ => {
                self.pending.insert(path, kind);
            }
        }
    }

    fn ready_to_flush(&self) -> bool {
        let Some(last) = self.last_event_at else { return false };
        let Some(first) = self.first_pending_at else { return false };
        last.elapsed() >= DEBOUNCE_QUIET || first.elapsed() >= DEBOUNCE_MAX_WAIT
    }

    fn flush(&mut self) -> Vec<Change> {
        self.first_pending_at = None;
        self.last_event_at = None;
        self.pending
            .drain()
            .map(|(path, kind)| Change { path, kind })
            .collect()
    }
}

/// Watches a set of directories and delivers debounced [`Change`] batches
/// to a caller-supplied callback, run on a background thread owned by the
/// `notify` watcher.
pub struct FileMonitor {
    _watcher: RecommendedWatcher,
    _worker: std::thread::JoinHandle<()>,
}

impl FileMonitor {
    /// Starts watching `directories`, calling `on_changes` with each
    /// flushed batch. `on_changes` runs on the monitor's background
    /// thread and must not block for long.
    pub fn start(
        directories: Vec<PathBuf>,
        on_changes: impl Fn(Vec<Change>) + Send + 'static,
    ) -> Result<Self> {
        let (tx, rx): (Sender<notify::Result<Event>>, Receiver<notify::Result<Event>>) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .map_err(|e| AppStreamError::parse(format!("failed to start file watcher: {e}")))?;

        for dir in &directories {
            if dir.is_dir() {
                watcher
                    .watch(dir, RecursiveMode::NonRecursive)
                    .map_err(|e| AppStreamError::parse(format!("failed to watch {}: {e}", dir.display())))?;
            }
        }

        let on_changes = Arc::new(on_changes);
        let worker_callback = Arc::clone(&on_changes);
        let worker = std::thread::spawn(move || run_debounce_loop(rx, worker_callback));

        Ok(Self {
            _watcher: watcher,
            _worker: worker,
        })
    }
}

fn run_debounce_loop(rx: Receiver<notify::Result<Event>>, on_changes: Arc<dyn Fn(Vec<Change>) + Send + Sync>) {
    let mut debouncer = Debouncer::new();
    loop {
        match rx.recv_timeout(Duration::from_millis(25)) {
            Ok(Ok(event)) => apply_event(&mut debouncer, event),
            Ok(Err(e)) => log::warn!("file watcher error: {e}"),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if debouncer.ready_to_flush() {
            let changes = debouncer.flush();
            if !changes.is_empty() {
                on_changes(changes);
            }
        }
    }
}

fn apply_event(debouncer: &mut Debouncer, event: Event) {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Added,
        EventKind::Remove(_) => ChangeKind::Removed,
        EventKind::Modify(_) => ChangeKind::Changed,
        _ => return,
    };
    for path in event.paths {
        if !is_ignorable(&path) {
            debouncer.record(path, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_remove_within_window_cancels_out() {
        let mut debouncer = Debouncer::new();
        let path = PathBuf::from("/watched/org.example.Foo.metainfo.xml");
        debouncer.record(path.clone(), ChangeKind::Added);
        debouncer.record(path, ChangeKind::Removed);
        assert!(debouncer.flush().is_empty());
    }

    #[test]
    fn repeated_modify_coalesces_to_one_change() {
        let mut debouncer = Debouncer::new();
        let path = PathBuf::from("/watched/org.example.Foo.metainfo.xml");
        debouncer.record(path.clone(), ChangeKind::Changed);
        debouncer.record(path.clone(), ChangeKind::Changed);
        debouncer.record(path, ChangeKind::Changed);
        let changes = debouncer.flush();
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn hidden_and_swap_files_are_ignored() {
        assert!(is_ignorable(Path::new("/watched/.foo.xml.swp")));
        assert!(is_ignorable(Path::new("/watched/foo.xml.swx")));
        assert!(is_ignorable(Path::new("/watched/foo.xml~")));
        assert!(!is_ignorable(Path::new("/watched/org.example.Foo.metainfo.xml")));
    }

    #[test]
    fn not_ready_before_any_event() {
        let debouncer = Debouncer::new();
        assert!(!debouncer.ready_to_flush());
    }
}
