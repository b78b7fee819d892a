use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gsp_core::config::ClientConfig;
use gsp_core::ingest::{self, BatchAccumulator};
use gsp_core::workload::{self, WorkloadSpec};
use gsp_core::{logging, GspClient, RawOperation};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "gsp-client", version, about = "Graph shortest path client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send every batch in a workload file to the server
    Run(RunArgs),
    /// Print the server's performance metrics
    Metrics {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write a random initial graph and workload
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Properties file (GSP.server, GSP.server.port)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Workload file: `<Q|A|D> <source> <target>` lines, batches ended by `F`
    #[arg(short, long, default_value = "resources/input")]
    batches: PathBuf,

    /// Defaults to a random UUID
    #[arg(long)]
    client_id: Option<String>,

    /// Maximum batches per second
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Print query results as they arrive
    #[arg(long)]
    print_results: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Node ids are drawn from 1..=nodes
    #[arg(long, default_value_t = 1_000, value_parser = clap::value_parser!(u32).range(2..=i32::MAX as i64))]
    nodes: u32,

    #[arg(long, default_value_t = 500_000)]
    edges: usize,

    #[arg(long = "batches", default_value_t = 1_000)]
    num_batches: usize,

    #[arg(long, default_value_t = 10)]
    ops_per_batch: usize,

    /// Percentage of writes, split evenly between adds and deletes
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    write_percentage: u8,

    #[arg(long, default_value = "resources/initial_graph.txt")]
    graph_out: PathBuf,

    #[arg(long, default_value = "resources/input")]
    batches_out: PathBuf,

    /// Seed for a reproducible workload
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Run(args) => run(args).await,
        Commands::Metrics { config } => {
            logging::init(None)?;
            let config = ClientConfig::load(config.as_deref())?;
            let mut client = GspClient::connect("metrics", config.endpoint()).await?;
            let reply = client.metrics().await?;
            println!("{}", reply.report);
            Ok(())
        }
        Commands::Generate(args) => generate(args),
    }
}

fn pacing(frequency: Option<f64>) -> Option<Interval> {
    let hz = frequency.filter(|hz| hz.is_finite() && *hz > 0.0)?;
    let mut ticker = interval(Duration::from_secs_f64(1.0 / hz));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(ticker)
}

/// Lines without exactly three fields never leave the client.
fn well_formed(batch: Vec<RawOperation>) -> Vec<RawOperation> {
    batch
        .into_iter()
        .filter(|op| {
            let ok = op.parts.len() == 3;
            if !ok {
                warn!(operation = %op, "invalid operation format, not sent");
            }
            ok
        })
        .collect()
}

async fn run(args: RunArgs) -> Result<()> {
    let client_id = args
        .client_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    logging::init(Some(Path::new(&format!("client_{}_log.txt", client_id))))?;

    let config = ClientConfig::load(args.config.as_deref()).context("loading client config")?;
    println!("Starting GSP client {}", client_id);
    println!("Connecting to server at {}", config.endpoint());

    let mut client = GspClient::connect(client_id.clone(), config.endpoint()).await?;
    let mut lines = ingest::open_lines(&args.batches)
        .await
        .with_context(|| format!("opening workload {}", args.batches.display()))?;

    let mut ticker = pacing(args.frequency);
    let mut acc = BatchAccumulator::new();
    let mut sent = 0u32;
    let mut failed = 0u32;
    let mut total = Duration::ZERO;

    while let Some(batch) = ingest::next_batch(&mut lines, &mut acc).await? {
        let batch = well_formed(batch);
        if let Some(ticker) = ticker.as_mut() {
            ticker.tick().await;
        }

        match client.send_batch(&batch).await {
            Ok(reply) => {
                sent += 1;
                total += reply.elapsed;
                if args.print_results {
                    for distance in &reply.value {
                        println!("{}", distance);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                error!(client = %client_id, error = %e, "batch processing failed");
            }
        }
    }

    if sent > 0 {
        let avg = total / sent;
        info!(client = %client_id, batches = sent, failed, avg_ms = avg.as_secs_f64() * 1000.0, "workload finished");
        println!("Batches sent: {} ({} failed)", sent, failed);
        println!("Average response time: {:.3}ms", avg.as_secs_f64() * 1000.0);
    }
    println!("Finished processing all batches. Client exiting...");
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn generate(args: GenerateArgs) -> Result<()> {
    let spec = WorkloadSpec {
        num_nodes: args.nodes,
        num_edges: args.edges,
        num_batches: args.num_batches,
        ops_per_batch: args.ops_per_batch,
        write_percentage: args.write_percentage,
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let edges = workload::initial_edges(&mut rng, &spec);
    workload::write_edge_list(create(&args.graph_out)?, &edges)?;
    println!("Wrote {} edges to {}", edges.len(), args.graph_out.display());

    let batches = workload::batches(&mut rng, &spec);
    workload::write_batches(create(&args.batches_out)?, &batches)?;
    println!(
        "Wrote {} batches of {} operations to {}",
        batches.len(),
        spec.ops_per_batch,
        args.batches_out.display()
    );
    Ok(())
}
