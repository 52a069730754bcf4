use crossbeam_channel::Sender;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{trace, warn};

use super::matcher::PatternMatcher;
use crate::metrics::ScanMetrics;
use crate::results::Occurrence;

const BUFFER_CAPACITY: usize = 65536;

/// Scans one file at a time, line by line, emitting an [`Occurrence`] into
/// the result channel for every match the pattern matcher reports.
#[derive(Debug)]
pub struct FileScanner {
    matcher: PatternMatcher,
    metrics: ScanMetrics,
}

impl FileScanner {
    /// Creates a new FileScanner with the given pattern matcher
    pub fn new(matcher: PatternMatcher, metrics: ScanMetrics) -> Self {
        Self { matcher, metrics }
    }

    /// Scans `path` and sends every occurrence into `tx`.
    ///
    /// Failure policy: any open, read, or decode error is caught here,
    /// logged with the file and cause, and the file contributes no further
    /// results. Occurrences already sent before the failure stand. Errors
    /// never propagate to sibling scans or the session.
    pub fn scan_file(&self, path: &Path, tx: &Sender<Occurrence>, cancelled: &AtomicBool) {
        trace!("Scanning file: {}", path.display());

        match self.emit_occurrences(path, tx, cancelled) {
            Ok(()) => self.metrics.record_file_scanned(),
            Err(err) => {
                warn!("Skipping unreadable file: {} ({})", path.display(), err);
                self.metrics.record_file_skipped();
            }
        }
    }

    /// Reads the file line by line and pushes matches into the channel.
    ///
    /// Returns early, releasing the file handle, when cancellation is
    /// observed either via the shared flag or as a send failure after the
    /// consumer dropped the stream.
    fn emit_occurrences(
        &self,
        path: &Path,
        tx: &Sender<Occurrence>,
        cancelled: &AtomicBool,
    ) -> std::io::Result<()> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut buf = String::new();
        let mut line_number = 0usize;

        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Ok(());
            }

            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Ok(());
            }
            line_number += 1;

            let line = buf.strip_suffix('\n').unwrap_or(&buf);
            let line = line.strip_suffix('\r').unwrap_or(line);

            for offset in self.matcher.find_in_line(line) {
                let occurrence = Occurrence {
                    file: path.to_path_buf(),
                    line: line_number,
                    offset,
                };
                if tx.send(occurrence).is_err() {
                    // Consumer is gone; stop producing for this file.
                    return Ok(());
                }
                self.metrics.record_occurrence();
            }
        }
    }
}
