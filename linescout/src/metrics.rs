use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Tracks per-session scan counters
#[derive(Debug, Clone, Default)]
pub struct ScanMetrics {
    files_scanned: Arc<AtomicU64>,
    files_skipped: Arc<AtomicU64>,
    occurrences_found: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Records a file scanned to completion
    pub fn record_file_scanned(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file skipped by the size filter or the failure policy
    pub fn record_file_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one occurrence handed to the consumer
    pub fn record_occurrence(&self) {
        self.occurrences_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets current scan statistics
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            occurrences_found: self.occurrences_found.load(Ordering::Relaxed),
        }
    }

    /// Logs current scan statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats: {} files scanned, {} files skipped, {} occurrences",
            stats.files_scanned, stats.files_skipped, stats.occurrences_found
        );
    }
}

/// Statistics about a scan session
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    pub files_scanned: u64,
    pub files_skipped: u64,
    pub occurrences_found: u64,
}
