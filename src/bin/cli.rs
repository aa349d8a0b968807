//! sitehost CLI
//!
//! Publishes zipped sites from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sitehost::{
    config,
    error::{AppError, Result},
    services::JobRunner,
    storage::JobStore,
};

/// sitehost - Zipped Site Publisher
#[derive(Parser, Debug)]
#[command(
    name = "sitehost",
    version,
    about = "Rehost the assets of a zipped site and publish its page"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "sitehost.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish a ZIP archive as a new job
    Publish {
        /// Path to the ZIP archive
        archive: PathBuf,

        /// Write the job report JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show a stored job record with its processing log
    Job {
        /// Job ID, e.g. job_20261019083000_0001
        id: String,
    },
}

/// Initialize logging based on verbosity flag and the configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = config::load_all(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.as_str())
        .unwrap_or("info");
    init_logging(cli.verbose, level);

    let config = loaded?;
    log::info!("Loaded configuration from {}", cli.config.display());

    let jobs = Arc::new(config::open_local_storage(&config.storage));

    match cli.command {
        Command::Publish { archive, out } => {
            let archive_name = archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| archive.display().to_string());
            let bytes = tokio::fs::read(&archive).await?;

            let store = config::open_object_store(&config.storage).await?;
            let runner = JobRunner::new(config.pipeline.clone(), store, jobs);
            let report = runner.submit(&archive_name, bytes).await?;

            let json = serde_json::to_string_pretty(&report)?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    log::info!("Report written to {}", path.display());
                }
                None => println!("{json}"),
            }

            if !report.is_success() {
                return Err(AppError::validation(format!(
                    "Job {} failed: {}",
                    report.job_id, report.message
                )));
            }
            if let Some(result) = &report.result {
                log::info!(
                    "Published {} ({} assets)",
                    result.final_document_url,
                    result.processed_count
                );
            }
        }

        Command::Validate => {
            // load_all already validated
            log::info!("✓ Config OK");
            log::info!(
                "Storage backend: {:?}, root: {}",
                config.storage.backend,
                config.storage.root_dir.display()
            );
        }

        Command::Job { id } => match jobs.load_job(&id).await? {
            Some(job) => println!("{}", serde_json::to_string_pretty(&job)?),
            None => {
                log::error!("Job {} not found", id);
                return Err(AppError::validation(format!("Job not found: {id}")));
            }
        },
    }

    Ok(())
}
