//! File-change watching.
//!
//! A thin polling wrapper: a background thread stats the file on an
//! interval and invokes the callback when the modification time or
//! existence changes. Deleting and recreating the file between polls counts
//! as a change. The watcher stops when dropped.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::SystemTime;

use tracing::debug;

use crate::error::Result;

/// Handle for a background file watcher.
pub struct FileWatcher {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FileWatcher {
    /// Spawns a watcher that invokes `on_change` whenever the file at
    /// `path` changes.
    ///
    /// The file does not need to exist yet; its appearance is a change.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher thread cannot be spawned.
    pub fn spawn<F>(path: impl Into<PathBuf>, interval: Duration, on_change: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let path = path.into();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("sflist-watch".to_string())
            .spawn(move || poll_loop(&path, interval, &stop_flag, on_change))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stops the watcher and waits for the background thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop<F>(path: &Path, interval: Duration, stop: &AtomicBool, mut on_change: F)
where
    F: FnMut(),
{
    let mut last = mtime(path);
    debug!(path = %path.display(), "watching file");
    while !stop.load(Ordering::Relaxed) {
        thread::sleep(interval);
        let current = mtime(path);
        if current != last {
            debug!(path = %path.display(), "file changed");
            last = current;
            on_change();
        }
    }
}

/// Modification time, or `None` when the file is missing or unreadable.
fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;
    use tempfile::TempDir;

    const POLL: Duration = Duration::from_millis(10);

    fn wait_for(counter: &AtomicUsize, at_least: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if counter.load(Ordering::SeqCst) >= at_least {
                return true;
            }
            thread::sleep(POLL);
        }
        false
    }

    #[test]
    fn test_detects_modification() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("watched");
        fs::write(&file, b"one").unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        let watcher = FileWatcher::spawn(&file, POLL, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        // Coarse mtime granularity on some filesystems; keep writing until
        // the watcher notices.
        let deadline = Instant::now() + Duration::from_secs(5);
        while counter.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(50));
            fs::write(&file, b"two").unwrap();
        }
        assert!(wait_for(&counter, 1), "modification was not observed");
        watcher.stop();
    }

    #[test]
    fn test_detects_file_appearing() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-yet");

        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        let _watcher = FileWatcher::spawn(&file, POLL, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        thread::sleep(Duration::from_millis(50));
        fs::write(&file, b"created").unwrap();
        assert!(wait_for(&counter, 1), "file creation was not observed");
    }

    #[test]
    fn test_stop_joins_thread() {
        let temp = TempDir::new().unwrap();
        let watcher = FileWatcher::spawn(temp.path().join("x"), POLL, || {}).unwrap();
        watcher.stop();
    }
}
