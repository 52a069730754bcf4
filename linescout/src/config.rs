use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{ScanError, ScanResult};

/// Configuration for one scan session.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.linescout.yaml` in the current directory
/// 3. Global `$HOME/.config/linescout/config.yaml`
///
/// # Configuration Format
///
/// The configuration uses YAML format. Example:
/// ```yaml
/// # Literal text to search for
/// pattern: "TODO"
///
/// # Root directory to search in
/// root_path: "."
///
/// # Concurrent file scans (default: CPU cores, minimum 2)
/// max_concurrency: 4
///
/// # Skip files larger than this many bytes (default: no limit)
/// max_file_size: 10485760
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
///
/// CLI arguments take precedence over config file values; the merging
/// behavior is defined in the `merge_with_cli` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// The literal text to search for
    pub pattern: String,

    /// Root directory to start the scan from
    pub root_path: PathBuf,

    /// Maximum number of files scanned concurrently
    /// Defaults to the number of CPU cores, never less than 2
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: NonZeroUsize,

    /// Skip files strictly larger than this many bytes
    /// If None, files of any size are scanned
    #[serde(default)]
    pub max_file_size: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get().max(2)).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl ScanConfig {
    /// Creates a config for the given pattern and root with default limits
    pub fn new(pattern: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            root_path: root_path.into(),
            max_concurrency: default_max_concurrency(),
            max_file_size: None,
            log_level: default_log_level(),
        }
    }

    /// Checks the session-level invariants before any work begins
    pub fn validate(&self) -> ScanResult<()> {
        if self.pattern.is_empty() {
            return Err(ScanError::EmptyPattern);
        }
        if !self.root_path.exists() {
            return Err(ScanError::root_not_found(&self.root_path));
        }
        if !self.root_path.is_dir() {
            return Err(ScanError::not_a_directory(&self.root_path));
        }
        Ok(())
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Default config locations
        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("linescout/config.yaml")),
            // Local config
            Some(PathBuf::from(".linescout.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        // Add existing config files
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // Build and deserialize
        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: ScanConfig) -> Self {
        // CLI values take precedence over config file values
        if !cli_config.pattern.is_empty() {
            self.pattern = cli_config.pattern;
        }
        if cli_config.root_path != PathBuf::from(".") {
            self.root_path = cli_config.root_path;
        }
        // Always use CLI concurrency if it differs from the default
        if cli_config.max_concurrency != default_max_concurrency() {
            self.max_concurrency = cli_config.max_concurrency;
        }
        if cli_config.max_file_size.is_some() {
            self.max_file_size = cli_config.max_file_size;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }
}
