/// Streaming scan pipeline: discovery feeds a bounded pool of file
/// scanners, whose matches flow through a backpressured channel to a single
/// consumer.
///
/// ```text
/// DirectoryWalker ──> work queue ──> FileScanner x N ──> ScanStream
///        │                                │                  │
///        └──────── cancellation flag ─────┴── (set on drop) ─┘
/// ```
///
/// The consumer pulls lazily and may stop at any point; dropping the stream
/// propagates cancellation back into discovery and every in-flight scan.
pub mod engine;
pub mod matcher;
pub mod processor;
pub mod walker;

pub use engine::{scan, ScanStream};
pub use matcher::PatternMatcher;
pub use processor::FileScanner;
pub use walker::DirectoryWalker;
