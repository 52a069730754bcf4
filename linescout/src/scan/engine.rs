use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

use super::matcher::PatternMatcher;
use super::processor::FileScanner;
use super::walker::DirectoryWalker;
use crate::config::ScanConfig;
use crate::errors::ScanResult;
use crate::metrics::ScanMetrics;
use crate::results::Occurrence;

/// Maximum number of occurrences that may queue between producers and the
/// consumer. A full channel blocks producers briefly instead of letting a
/// slow consumer force unbounded buffering; a dropped consumer disconnects
/// the channel and wakes every blocked producer with a send error.
const RESULT_CHANNEL_CAPACITY: usize = 1024;

/// Maximum number of discovered files waiting for a scan slot. Keeps
/// discovery from racing arbitrarily far ahead of the scanners on huge
/// trees; a full queue blocks the walker, not the consumer.
const WORK_QUEUE_CAPACITY: usize = 1024;

/// Starts a scan session and returns its result stream.
///
/// Validation failures (empty pattern, missing or non-directory root) are
/// reported before any thread or file handle exists. Each call starts an
/// independent session; the returned stream is single-pass.
///
/// Discovery and scanning run in the background: a driver thread walks the
/// tree and feeds admitted files to `max_concurrency` worker threads, which
/// are the only throttle on simultaneously open files. Which queued file a
/// freed worker picks up next is unspecified. Dropping the stream cancels
/// the session and joins the background work before returning.
pub fn scan(config: &ScanConfig) -> ScanResult<ScanStream> {
    config.validate()?;

    info!(
        "Starting scan for {:?} under {} ({} concurrent scans)",
        config.pattern,
        config.root_path.display(),
        config.max_concurrency
    );

    let metrics = ScanMetrics::new();
    let cancelled = Arc::new(AtomicBool::new(false));
    let (result_tx, result_rx) = crossbeam_channel::bounded(RESULT_CHANNEL_CAPACITY);
    let (work_tx, work_rx) = crossbeam_channel::bounded::<PathBuf>(WORK_QUEUE_CAPACITY);

    let scanner = Arc::new(FileScanner::new(
        PatternMatcher::new(config.pattern.clone()),
        metrics.clone(),
    ));

    // One worker per concurrency slot. Each holds its own clone of the
    // result sender; the channel disconnects once the last scan finishes.
    let mut workers = Vec::with_capacity(config.max_concurrency.get());
    for i in 0..config.max_concurrency.get() {
        let work_rx = work_rx.clone();
        let result_tx = result_tx.clone();
        let scanner = scanner.clone();
        let cancel = cancelled.clone();
        let handle = thread::Builder::new()
            .name(format!("linescout-scan-{i}"))
            .spawn(move || {
                for path in work_rx {
                    // A queued file whose session was cancelled is never opened.
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    scanner.scan_file(&path, &result_tx, &cancel);
                }
            })?;
        workers.push(handle);
    }
    drop(work_rx);
    drop(result_tx);

    let walker = DirectoryWalker::new(config.max_file_size, metrics.clone());
    let root = config.root_path.clone();
    let cancel_flag = cancelled.clone();

    let driver = thread::Builder::new()
        .name("linescout-walker".into())
        .spawn(move || {
            // A failed submit means every worker has already shut down.
            walker.run(&root, &cancel_flag, |path| work_tx.send(path).is_ok());

            // Close the work queue so idle workers stop waiting, then wait
            // for in-flight scans to wind down.
            drop(work_tx);
            for worker in workers {
                let _ = worker.join();
            }
            debug!("Scan session drained");
        })?;

    Ok(ScanStream {
        rx: Some(result_rx),
        cancelled,
        driver: Some(driver),
        metrics,
    })
}

/// A live, single-pass stream of [`Occurrence`] values from one scan session.
///
/// Results for a single file arrive in (line, offset) order; across files no
/// ordering is guaranteed. Iteration ends when every admitted file has been
/// scanned, or immediately after [`cancel`](ScanStream::cancel) is called.
/// Dropping the stream (including simply letting it go out of scope mid
/// iteration) is the cancellation signal: producers observe it at their
/// next line read, slot wait, or channel push, and the drop blocks until the
/// session has fully unwound.
#[derive(Debug)]
pub struct ScanStream {
    rx: Option<Receiver<Occurrence>>,
    cancelled: Arc<AtomicBool>,
    driver: Option<JoinHandle<()>>,
    metrics: ScanMetrics,
}

impl ScanStream {
    /// Requests cancellation without consuming the stream.
    ///
    /// Subsequent `next` calls return `None`; background work stops at its
    /// next cancellation check. Useful for a UI holding a handle to a scan
    /// it may abort.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Counters for this session, shared with the background workers
    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }
}

impl Iterator for ScanStream {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        // Nothing is delivered after cancellation; results racing the
        // cancel signal are dropped, never duplicated.
        if self.cancelled.load(Ordering::Relaxed) {
            return None;
        }
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for ScanStream {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        // Disconnect the channel so producers blocked on a full buffer wake
        // up with a send error instead of waiting for a consumer that will
        // never come back.
        self.rx.take();
        if let Some(driver) = self.driver.take() {
            let _ = driver.join();
        }
        self.metrics.log_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScanError;
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    #[test]
    fn test_scan_rejects_empty_pattern() {
        let dir = tempdir().unwrap();
        let config = ScanConfig::new("", dir.path());
        assert!(matches!(scan(&config), Err(ScanError::EmptyPattern)));
    }

    #[test]
    fn test_scan_rejects_missing_root() {
        let dir = tempdir().unwrap();
        let config = ScanConfig::new("x", dir.path().join("nope"));
        assert!(matches!(scan(&config), Err(ScanError::RootNotFound(_))));
    }

    #[test]
    fn test_finds_occurrences_across_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("1.txt"), "find me").unwrap();
        fs::write(dir.path().join("2.txt"), "and find me too").unwrap();

        let config = ScanConfig::new("find", dir.path());
        let results: Vec<Occurrence> = scan(&config).unwrap().collect();

        assert_eq!(results.len(), 2);
        for occ in &results {
            assert_eq!(occ.line, 1);
            if occ.file.ends_with("1.txt") {
                assert_eq!(occ.offset, 0);
            } else {
                assert_eq!(occ.offset, 4);
            }
        }
    }

    #[test]
    fn test_early_drop_unwinds_quickly() {
        let dir = tempdir().unwrap();
        for i in 0..50 {
            let content: String = (0..5_000).map(|j| format!("filler {i} {j} hit\n")).collect();
            fs::write(dir.path().join(format!("{i}.txt")), content).unwrap();
        }

        let config = ScanConfig::new("hit", dir.path());
        let mut stream = scan(&config).unwrap();
        let first = stream.next();
        assert!(first.is_some());

        let start = Instant::now();
        drop(stream);
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "session did not unwind promptly after drop"
        );
    }

    #[test]
    fn test_cancel_stops_delivery() {
        let dir = tempdir().unwrap();
        let content: String = (0..1_000).map(|i| format!("row {i} hit\n")).collect();
        fs::write(dir.path().join("data.txt"), content).unwrap();

        let config = ScanConfig::new("hit", dir.path());
        let mut stream = scan(&config).unwrap();
        assert!(stream.next().is_some());

        stream.cancel();
        assert!(stream.is_cancelled());
        assert!(stream.next().is_none());
    }
}
