use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use clap::Parser;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mr_coordinator::{inputs, CoordinatorConfig};

#[derive(Parser)]
#[command(name = "mr-coordinator")]
#[command(about = "Runs one MapReduce job and serves tasks to workers until it is done")]
struct Args {
    /// Number of reduce partitions
    #[arg(short = 'r', long, default_value_t = 10)]
    n_reduce: usize,

    /// Listen address (overrides MR_COORDINATOR_ADDR)
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Input files or glob patterns, one map task per file
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mr_coordinator=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = CoordinatorConfig::from_env()?;
    if let Some(addr) = args.addr {
        config.addr = addr;
    }

    let inputs = inputs::expand(&args.inputs)?;
    let handle = mr_coordinator::start(inputs, args.n_reduce, config.clone()).await?;

    while !handle.done() {
        sleep(Duration::from_secs(1)).await;
    }

    info!("job done, serving {:?} more before exit", config.done_grace);
    sleep(config.done_grace).await;

    handle.shutdown().await
}
