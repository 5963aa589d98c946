//! Filesystem watcher for live reload.
//!
//! Every directory below the watched roots gets its own non-recursive OS
//! watch. Directories created while the server runs are added on their
//! create event. Write events pass through a [`DebounceGate`] before the
//! change callback runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::debouncer::DebounceGate;

/// Capacity of the channel between the notify thread and the event loop.
const EVENT_BUFFER: usize = 100;

/// A raw event reduced to what the watcher acts on.
#[derive(Debug, PartialEq, Eq)]
enum Change {
    /// File content was written.
    Write(PathBuf),
    /// A directory appeared and must be watched.
    DirCreated(PathBuf),
}

/// Classify a notify event. Returns nothing for ignored kinds.
fn classify(event: &Event) -> Vec<Change> {
    match event.kind {
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other) => {
            event.paths.iter().cloned().map(Change::Write).collect()
        }
        EventKind::Create(CreateKind::Folder) => {
            event.paths.iter().cloned().map(Change::DirCreated).collect()
        }
        // A directory moved into the tree needs watching like a new one.
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both | RenameMode::Any)) => event
            .paths
            .iter()
            .filter(|p| p.is_dir())
            .cloned()
            .map(Change::DirCreated)
            .collect(),
        _ => Vec::new(),
    }
}

/// Collect `root` and every directory beneath it.
fn collect_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![root.to_path_buf()];
    let mut i = 0;
    while let Some(dir) = dirs.get(i).cloned() {
        i += 1;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Cannot read directory");
                continue;
            }
        };
        for entry in entries.flatten() {
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                dirs.push(entry.path());
            }
        }
    }
    dirs
}

/// Register every directory in `dirs`. Returns how many were added.
fn watch_dirs(watcher: &mut RecommendedWatcher, dirs: Vec<PathBuf>) -> usize {
    dirs.into_iter()
        .filter(|dir| match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Failed to watch directory");
                false
            }
        })
        .count()
}

/// Watches directory trees and reports debounced changes.
pub(crate) struct FileWatcher {
    roots: Vec<PathBuf>,
    debounce: Duration,
}

impl FileWatcher {
    /// Create a watcher over `roots`. Roots that do not exist are skipped at start.
    pub(crate) fn new(roots: Vec<PathBuf>, debounce: Duration) -> Self {
        Self { roots, debounce }
    }

    /// Start watching.
    ///
    /// Spawns the event loop task, which runs `on_change` for every write
    /// accepted by the debounce gate and stops when `shutdown` turns `true`
    /// or the event stream closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS watcher cannot be created. Failures to
    /// watch individual directories are only logged.
    pub(crate) fn start<F>(
        self,
        on_change: F,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<JoinHandle<()>, notify::Error>
    where
        F: Fn(&Path) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<notify::Result<Event>>(EVENT_BUFFER);

        let mut watcher = notify::recommended_watcher(move |res| {
            // Callback runs on the notify thread, outside the runtime.
            let _ = tx.blocking_send(res);
        })?;

        let mut watched = 0;
        for root in self.roots.iter().filter(|r| r.is_dir()) {
            watched += watch_dirs(&mut watcher, collect_dirs(root));
        }
        tracing::info!(directories = watched, "Watching for changes");

        let mut gate = DebounceGate::new(self.debounce);

        Ok(tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = rx.recv() => match res {
                        Some(Ok(event)) => {
                            for change in classify(&event) {
                                match change {
                                    Change::Write(path) => {
                                        if gate.accept() {
                                            tracing::info!(path = %path.display(), "File changed");
                                            on_change(&path);
                                        }
                                    }
                                    Change::DirCreated(path) => {
                                        let walk_root = path.clone();
                                        let dirs = tokio::task::spawn_blocking(move || collect_dirs(&walk_root))
                                            .await
                                            .unwrap_or_default();
                                        let added = watch_dirs(&mut watcher, dirs);
                                        tracing::debug!(path = %path.display(), directories = added, "Watching new directory");
                                    }
                                }
                            }
                        }
                        Some(Err(e)) => tracing::warn!(error = %e, "File watcher error"),
                        None => break,
                    },
                    () = super::shutdown_requested(&mut shutdown) => break,
                }
            }
            tracing::debug!("File watcher stopped");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use notify::event::{AccessKind, DataChange, MetadataKind, RemoveKind, RenameMode};
    use pretty_assertions::assert_eq;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_classify_data_write() {
        let ev = event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), "/s/a.html");
        assert_eq!(classify(&ev), vec![Change::Write(PathBuf::from("/s/a.html"))]);
    }

    #[test]
    fn test_classify_generic_modify_is_write() {
        let ev = event(EventKind::Modify(ModifyKind::Any), "/s/a.css");
        assert_eq!(classify(&ev), vec![Change::Write(PathBuf::from("/s/a.css"))]);
    }

    #[test]
    fn test_classify_ignores_non_writes() {
        let ignored = [
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            EventKind::Remove(RemoveKind::File),
            EventKind::Create(CreateKind::File),
            EventKind::Access(AccessKind::Any),
        ];
        for kind in ignored {
            assert_eq!(classify(&event(kind, "/nonexistent/a.html")), Vec::new());
        }
    }

    #[test]
    fn test_classify_folder_create() {
        let ev = event(EventKind::Create(CreateKind::Folder), "/s/blog");
        assert_eq!(classify(&ev), vec![Change::DirCreated(PathBuf::from("/s/blog"))]);
    }

    #[test]
    fn test_classify_directory_moved_in() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("moved");
        fs::create_dir(&dir).unwrap();

        let to = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To))).add_path(dir.clone());
        assert_eq!(classify(&to), vec![Change::DirCreated(dir.clone())]);

        let both = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(temp.path().join("gone"))
            .add_path(dir.clone());
        assert_eq!(classify(&both), vec![Change::DirCreated(dir)]);
    }

    #[tokio::test]
    async fn test_moved_in_directory_is_watched() {
        let temp = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let staged = outside.path().join("blog");
        fs::create_dir(&staged).unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let _handle = FileWatcher::new(vec![temp.path().to_path_buf()], Duration::from_millis(10))
            .start(
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                shutdown_rx,
            )
            .unwrap();

        let moved = temp.path().join("blog");
        fs::rename(&staged, &moved).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let before = count.load(Ordering::SeqCst);

        assert!(write_until_notified(&moved.join("post.html"), &count, before).await);
    }

    #[test]
    fn test_classify_generic_create_checks_disk() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("new");
        fs::create_dir(&dir).unwrap();

        let ev = Event::new(EventKind::Create(CreateKind::Any)).add_path(dir.clone());
        assert_eq!(classify(&ev), vec![Change::DirCreated(dir)]);
    }

    #[test]
    fn test_collect_dirs_includes_root_and_nested() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::create_dir_all(temp.path().join("c")).unwrap();
        fs::write(temp.path().join("a/file.html"), "x").unwrap();

        let mut dirs = collect_dirs(temp.path());
        dirs.sort();

        assert_eq!(
            dirs,
            vec![
                temp.path().to_path_buf(),
                temp.path().join("a"),
                temp.path().join("a/b"),
                temp.path().join("c"),
            ]
        );
    }

    /// Write to `path` until the counter moves or the timeout elapses.
    async fn write_until_notified(path: &Path, counter: &AtomicUsize, from: usize) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while tokio::time::Instant::now() < deadline {
            fs::write(path, "changed").unwrap();
            tokio::time::sleep(Duration::from_millis(150)).await;
            if counter.load(Ordering::SeqCst) > from {
                return true;
            }
        }
        false
    }

    #[tokio::test]
    async fn test_write_triggers_callback() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("index.html");
        fs::write(&file, "initial").unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = FileWatcher::new(vec![temp.path().to_path_buf()], Duration::from_millis(10))
            .start(
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                shutdown_rx,
            )
            .unwrap();

        assert!(write_until_notified(&file, &count, 0).await);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_new_directory_is_watched() {
        let temp = tempfile::tempdir().unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let _handle = FileWatcher::new(vec![temp.path().to_path_buf()], Duration::from_millis(10))
            .start(
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                shutdown_rx,
            )
            .unwrap();

        let nested = temp.path().join("blog");
        fs::create_dir(&nested).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let before = count.load(Ordering::SeqCst);

        assert!(write_until_notified(&nested.join("post.html"), &count, before).await);
    }

    #[tokio::test]
    async fn test_missing_root_is_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let result = FileWatcher::new(vec![temp.path().join("missing")], Duration::ZERO)
            .start(|_| {}, shutdown_rx);

        assert!(result.is_ok());
    }
}
