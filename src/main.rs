use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use notidle::config::{self as cfg, ConfigManager};
use notidle::logger::ActivityLog;
use notidle::shell::Shell;

/// Notidle CLI
#[derive(Debug, Parser)]
#[command(
    name = notidle::PKG_NAME,
    version = notidle::PKG_VERSION,
    about = "An anti-idle helper that keeps a session awake with tiny Enigo nudges"
)]
struct Args {
    /// Path to the JSON configuration file (default: ~/.notidle_config.json)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable dry-run mode (log injections instead of simulating real input)
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Set log level (e.g., trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Print the JSON Schema for the configuration and exit
    #[arg(long = "print-schema")]
    print_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Honor --log-level by overriding RUST_LOG before initializing tracing.
    if let Some(level) = &args.log_level {
        let level = match level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" | "warning" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        };
        let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
    }

    if args.log_level.is_none() {
        notidle::init_tracing();
    }

    if args.print_schema {
        let schema = cfg::generate_schema();
        let json = serde_json::to_string_pretty(&schema)?;
        println!("{json}");
        return Ok(());
    }

    let mut manager = match &args.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    let config = manager.load()?;
    info!(
        version = notidle::PKG_VERSION,
        config = %manager.path().display(),
        dry_run = args.dry_run,
        "Starting Notidle"
    );
    debug!(target: "notidle", "Configuration loaded successfully");

    let log = ActivityLog::new(&config.log_file_path);

    let mut shell = Shell::new(manager, log, args.dry_run);
    shell.run().await?;

    info!("Notidle exited");
    Ok(())
}
