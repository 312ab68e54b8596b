use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mr_common::{app_by_name, BUILTIN_APPS};
use mr_worker::{Worker, WorkerConfig};

#[derive(Parser)]
#[command(name = "mr-worker")]
#[command(about = "Runs map and reduce tasks handed out by a coordinator")]
struct Args {
    /// Application to run (wc, indexer)
    #[arg(long, default_value = "wc")]
    app: String,

    /// Coordinator base URL (overrides MR_COORDINATOR_URL)
    #[arg(long)]
    coordinator: Option<String>,

    /// Directory for partition and output files (overrides MR_WORK_DIR).
    /// Input files are still read relative to the current directory.
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mr_worker=info")),
        )
        .init();

    let args = Args::parse();

    let Some(app) = app_by_name(&args.app) else {
        bail!(
            "unknown app '{}', expected one of {}",
            args.app,
            BUILTIN_APPS.join(", ")
        );
    };

    let mut config = WorkerConfig::from_env()?;
    if let Some(url) = args.coordinator {
        config.coordinator_url = url;
    }
    if let Some(dir) = args.work_dir {
        config.work_dir = dir;
    }

    Worker::new(app, config)?.run().await;
    Ok(())
}
