use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::metrics::ScanMetrics;

/// Recursively discovers regular files under a root directory.
///
/// Traversal order is unspecified; consumers must not depend on the order in
/// which files are admitted. Hidden files are visited and ignore files are
/// not honored: the walk covers every regular file reachable without
/// following symlinks.
#[derive(Debug)]
pub struct DirectoryWalker {
    max_file_size: Option<u64>,
    metrics: ScanMetrics,
}

impl DirectoryWalker {
    /// Creates a walker with an optional file-size admission filter
    pub fn new(max_file_size: Option<u64>, metrics: ScanMetrics) -> Self {
        Self {
            max_file_size,
            metrics,
        }
    }

    /// Walks the tree under `root`, invoking `submit` for every admitted file.
    ///
    /// Discovery stops at the next entry once `cancelled` is set, or as soon
    /// as `submit` returns `false` (the scheduler has shut down). Entries
    /// that cannot be read, or whose size cannot be determined when a size
    /// filter is configured, are skipped with a warning and never fail the
    /// session.
    pub fn run(
        &self,
        root: &Path,
        cancelled: &AtomicBool,
        mut submit: impl FnMut(PathBuf) -> bool,
    ) {
        let walk = WalkBuilder::new(root)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .follow_links(false)
            .build();

        let mut discovered = 0usize;
        for entry in walk {
            if cancelled.load(Ordering::Relaxed) {
                debug!("Discovery cancelled after {} files", discovered);
                return;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if let Some(limit) = self.max_file_size {
                match entry.metadata() {
                    Ok(metadata) if metadata.len() > limit => {
                        warn!(
                            "Skipping file (size {} > limit {} bytes): {}",
                            metadata.len(),
                            limit,
                            entry.path().display()
                        );
                        self.metrics.record_file_skipped();
                        continue;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(
                            "Cannot read file size: {} ({}), skipping file",
                            entry.path().display(),
                            err
                        );
                        self.metrics.record_file_skipped();
                        continue;
                    }
                }
            }

            discovered += 1;
            if !submit(entry.into_path()) {
                debug!("Scheduler closed, stopping discovery");
                return;
            }
        }

        debug!("Discovery complete: {} files admitted", discovered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::AtomicBool;
    use tempfile::tempdir;

    fn collect(walker: &DirectoryWalker, root: &Path) -> Vec<PathBuf> {
        let cancelled = AtomicBool::new(false);
        let mut files = Vec::new();
        walker.run(root, &cancelled, |path| {
            files.push(path);
            true
        });
        files
    }

    #[test]
    fn test_discovers_nested_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "b").unwrap();

        let walker = DirectoryWalker::new(None, ScanMetrics::new());
        let mut files = collect(&walker, dir.path());
        files.sort();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.txt"));
        assert!(files[1].ends_with("sub/b.txt"));
    }

    #[test]
    fn test_discovers_hidden_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden"), "secret").unwrap();

        let walker = DirectoryWalker::new(None, ScanMetrics::new());
        let files = collect(&walker, dir.path());
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_skips_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("only_dirs")).unwrap();

        let walker = DirectoryWalker::new(None, ScanMetrics::new());
        assert!(collect(&walker, dir.path()).is_empty());
    }

    #[test]
    fn test_size_filter_skips_oversized_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("small.txt"), "tiny").unwrap();
        fs::write(dir.path().join("big.txt"), "x".repeat(2048)).unwrap();

        let metrics = ScanMetrics::new();
        let walker = DirectoryWalker::new(Some(1024), metrics.clone());
        let files = collect(&walker, dir.path());

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("small.txt"));
        assert_eq!(metrics.get_stats().files_skipped, 1);
    }

    #[test]
    fn test_size_filter_admits_exact_limit() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("exact.txt"), "x".repeat(100)).unwrap();

        let walker = DirectoryWalker::new(Some(100), ScanMetrics::new());
        assert_eq!(collect(&walker, dir.path()).len(), 1);
    }

    #[test]
    fn test_cancellation_stops_discovery() {
        let dir = tempdir().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("{i}.txt")), "data").unwrap();
        }

        let walker = DirectoryWalker::new(None, ScanMetrics::new());
        let cancelled = AtomicBool::new(false);
        let mut seen = 0;
        walker.run(dir.path(), &cancelled, |_| {
            seen += 1;
            cancelled.store(true, Ordering::Relaxed);
            true
        });

        assert_eq!(seen, 1);
    }

    #[test]
    fn test_closed_scheduler_stops_discovery() {
        let dir = tempdir().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("{i}.txt")), "data").unwrap();
        }

        let walker = DirectoryWalker::new(None, ScanMetrics::new());
        let cancelled = AtomicBool::new(false);
        let mut seen = 0;
        walker.run(dir.path(), &cancelled, |_| {
            seen += 1;
            false
        });

        assert_eq!(seen, 1);
    }
}
