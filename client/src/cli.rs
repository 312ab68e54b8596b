use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mr_common::{app_by_name, env::env_or, sequential, DoneReply, JobSnapshot, Task, BUILTIN_APPS};
use reqwest::Client;

const DEFAULT_COORDINATOR_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "mrctl")]
#[command(about = "Inspect a running MapReduce job or run one sequentially")]
struct Cli {
    /// Coordinator base URL (overrides MR_COORDINATOR_URL)
    #[arg(long, global = true)]
    coordinator: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show phase and per-task state of the running job
    Status {
        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print whether the job is done
    Done,
    /// Run a job in-process and write one output file
    Sequential {
        #[arg(long, default_value = "wc")]
        app: String,

        #[arg(long, default_value = "mr-out-sequential")]
        output: PathBuf,

        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<String>,
    },
}

fn print_tasks(label: &str, tasks: &[Task]) {
    println!("  {} tasks:", label);
    for t in tasks {
        let source = t.source.as_deref().unwrap_or("-");
        println!(
            "    {:>4}  {:<10} attempt={} source={}",
            t.seq,
            format!("{:?}", t.status),
            t.attempt,
            source
        );
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let base_url = match cli.coordinator {
        Some(url) => url,
        None => env_or("MR_COORDINATOR_URL", DEFAULT_COORDINATOR_URL.to_string())?,
    };
    let base_url = base_url.trim_end_matches('/').to_string();
    let client = Client::builder().no_proxy().build()?;

    match cli.command {
        Commands::Status { json } => {
            let url = format!("{}/api/v1/job", base_url);
            let resp = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("cannot reach coordinator at {}", base_url))?;
            if !resp.status().is_success() {
                bail!("coordinator answered {} for {}", resp.status(), url);
            }
            let snap: JobSnapshot = resp.json().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snap)?);
                return Ok(());
            }

            println!("Job:");
            println!("  phase: {:?}", snap.phase);
            println!("  done: {}", snap.done);
            println!("  started_at: {}", snap.started_at);
            println!(
                "  map: {} total, {} available, {} assigned, {} completed",
                snap.n_map,
                snap.map_counts.available,
                snap.map_counts.assigned,
                snap.map_counts.completed
            );
            println!(
                "  reduce: {} total, {} available, {} assigned, {} completed",
                snap.n_reduce,
                snap.reduce_counts.available,
                snap.reduce_counts.assigned,
                snap.reduce_counts.completed
            );
            print_tasks("map", &snap.map_tasks);
            print_tasks("reduce", &snap.reduce_tasks);
        }

        Commands::Done => {
            let url = format!("{}/api/v1/job/done", base_url);
            let reply: DoneReply = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("cannot reach coordinator at {}", base_url))?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", reply.done);
        }

        Commands::Sequential { app, output, inputs } => {
            let Some(app) = app_by_name(&app) else {
                bail!(
                    "unknown app '{}', expected one of {}",
                    app,
                    BUILTIN_APPS.join(", ")
                );
            };
            let keys = sequential::run(app.as_ref(), &inputs, &output)?;
            println!(
                "{} keys from {} inputs written to {}",
                keys,
                inputs.len(),
                output.display()
            );
        }
    }

    Ok(())
}
