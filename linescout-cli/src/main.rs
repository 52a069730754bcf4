use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use linescout::{scan, ScanConfig};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Literal text to search for
    pattern: String,

    /// Root directory to search in
    #[arg(short = 'd', long, default_value = ".")]
    root: PathBuf,

    /// Number of concurrent file scans (default: CPU cores, minimum 2)
    #[arg(short = 'j', long)]
    concurrency: Option<NonZeroUsize>,

    /// Skip files larger than this many bytes
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Stop after this many occurrences
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Configuration file to load before applying CLI arguments
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print each occurrence as a JSON object
    #[arg(long)]
    json: bool,

    /// Print only summary statistics, not individual occurrences
    #[arg(short, long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --log-level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut cli_config = ScanConfig::new(cli.pattern, cli.root);
    if let Some(concurrency) = cli.concurrency {
        cli_config.max_concurrency = concurrency;
    }
    cli_config.max_file_size = cli.max_file_size;
    cli_config.log_level = cli.log_level;

    let config = if cli.config.is_some() {
        ScanConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli_config)
    } else {
        // Default config locations are optional.
        match ScanConfig::load() {
            Ok(file_config) => file_config.merge_with_cli(cli_config),
            Err(_) => cli_config,
        }
    };

    info!(
        "Searching for {:?} under {}",
        config.pattern,
        config.root_path.display()
    );

    let mut stream = scan(&config)?;
    let metrics = stream.metrics().clone();
    let mut printed = 0usize;

    // The limit is checked before pulling, so the stream is never asked
    // for an occurrence that would only be thrown away.
    while !cli.limit.is_some_and(|limit| printed >= limit) {
        let Some(occurrence) = stream.next() else {
            break;
        };

        if cli.json {
            println!("{}", serde_json::to_string(&occurrence)?);
        } else if !cli.stats {
            println!(
                "{}:{}:{}",
                occurrence.file.display().to_string().blue(),
                occurrence.line.to_string().green(),
                occurrence.offset
            );
        }

        printed += 1;
    }

    // Breaking out early cancels the session; the drop blocks until the
    // background scans have wound down.
    drop(stream);

    if cli.stats {
        let stats = metrics.get_stats();
        println!(
            "{} occurrences in {} files scanned ({} skipped)",
            stats.occurrences_found, stats.files_scanned, stats.files_skipped
        );
    }

    Ok(())
}
