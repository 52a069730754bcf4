pub mod config;
pub mod errors;
pub mod metrics;
pub mod results;
pub mod scan;

pub use config::ScanConfig;
pub use errors::{ScanError, ScanResult};
pub use results::Occurrence;
pub use scan::{scan, ScanStream};
