//! hotboard CLI
//!
//! Local execution entry point for the community hot-post harvester.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hotboard::{config, dates, error::Result, models::Target, pipeline};

/// hotboard - Korean community hot-post harvester
#[derive(Parser, Debug)]
#[command(
    name = "hotboard",
    version,
    about = "Harvest trending community posts for one day"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one harvest and store the CSV artifact
    Run {
        /// Target day as MMDD; defaults to yesterday in KST
        #[arg(long)]
        date: Option<String>,

        /// Override the output directory from configuration
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show effective configuration and enabled sources
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("hotboard starting...");

    let mut config = config::load_or_default(&cli.config);

    match cli.command {
        Command::Run { date, output } => {
            if let Some(dir) = output {
                config.output.dir = dir.display().to_string();
            }

            let target = match date {
                Some(code) => Target::new(code)?,
                None => {
                    let now = chrono::Utc::now().with_timezone(&dates::kst());
                    Target::yesterday(now)
                }
            };

            let report = pipeline::run_harvest(&config, &target).await?;
            log::info!(
                "Harvest complete: {} records in {}",
                report.summary.total,
                report.locator
            );
        }

        Command::Validate => {
            log::info!("Validating configuration from {}", cli.config.display());
            if let Err(e) = config::load_validated(&cli.config) {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }

        Command::Info => {
            log::info!("Config file: {}", cli.config.display());
            log::info!("Output directory: {}", config.output.dir);
            log::info!(
                "S3 upload: {}",
                config.output.s3_bucket.as_deref().unwrap_or("disabled")
            );
            for source in config.enabled_sources() {
                let sc = config.source(source);
                log::info!("  {} ({}): {}", source.label(), source, sc.base_url);
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
