use std::{path::PathBuf, time::Instant};

use clap::Parser;
use cleaner::Cleaner;
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Deletes series from a Prometheus-compatible store, sweeping tombstones between batches")]
struct Cli {
    /// Job description (YAML)
    #[arg(long, env = "PROM_CLEANER_JOB", default_value = "job.yml")]
    job: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let start_time = Instant::now();

    tracing::info!("prometheus cleaner");
    let job = prom_cleaner::load_job(&cli.job)?;
    let cleaner = Cleaner::new(job);
    let report = cleaner
        .run()
        .await
        .wrap_err_with(|| format!("failed to clean store {}", cleaner.job().store_address))?;
    tracing::info!(
        batches = report.batches,
        sweeps = report.sweeps,
        "success, elapsed {:?}",
        start_time.elapsed()
    );
    Ok(())
}
