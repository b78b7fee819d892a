use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use gsp_core::config::ServerConfig;
use gsp_core::ingest::{self, BatchAccumulator, LineResult};
use gsp_core::{logging, GspEngine, GspService};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use tokio::sync::oneshot;
use tonic::transport::Server;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gsp-server", version, about = "Graph shortest path server")]
struct Cli {
    /// Properties file (GSP.server, GSP.server.port, GSP.log.file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial edge list, one `<source> <target>` per line, ended by `S`
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// Read the initial graph and then batches from stdin instead of
    /// running the console
    #[arg(long)]
    stdin_workload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ServerConfig::load(cli.config.as_deref()).context("loading server config")?;
    logging::init(config.log_file.as_deref())?;
    let addr = config.bind_addr()?;

    let engine = GspEngine::new();
    if let Some(path) = &cli.graph {
        let mut lines = ingest::open_lines(path)
            .await
            .with_context(|| format!("opening graph file {}", path.display()))?;
        let loaded = load_graph(&engine, &mut lines).await?;
        println!(
            "Initial graph loaded: {} edges, {} nodes",
            loaded,
            engine.store().node_count()
        );
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let service = GspService::new(engine.clone());
    let server = tokio::spawn(async move {
        Server::builder()
            .add_service(service.into_server())
            .serve_with_shutdown(addr, async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    info!(%addr, "GSP server listening");
    println!("GSP server listening on {}", addr);

    if cli.stdin_workload {
        run_stdin_workload(&engine).await?;
    } else {
        run_console(&engine).await?;
    }

    let _ = shutdown_tx.send(());
    server.await?.context("gRPC server failed")?;
    info!(metrics = %serde_json::to_string(&engine.metrics())?, "GSP server stopped");
    Ok(())
}

async fn load_graph<S>(engine: &GspEngine, lines: &mut S) -> Result<usize>
where
    S: futures::Stream<Item = LineResult> + Unpin,
{
    let list = ingest::read_edge_list(lines).await?;
    if list.rejected > 0 {
        warn!(rejected = list.rejected, "skipped invalid edge lines");
    }
    if !list.terminated {
        warn!("edge list ended without a terminating 'S' line");
    }

    let loader = engine.clone();
    let loaded = tokio::task::spawn_blocking(move || loader.load_edges(list.edges)).await?;
    Ok(loaded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleCommand {
    Performance,
    Json,
    Exit,
}

impl ConsoleCommand {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            c if c.eq_ignore_ascii_case("P") => Some(Self::Performance),
            c if c.eq_ignore_ascii_case("J") => Some(Self::Json),
            c if c.eq_ignore_ascii_case("E") => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Operator console. Returns on `E`, end of stdin, or Ctrl-C.
async fn run_console(engine: &GspEngine) -> Result<()> {
    println!();
    println!("Enter 'P' to display the performance of the server.");
    println!("Enter 'J' to dump the metrics as JSON.");
    println!("Enter 'E' to stop the server.");

    let mut lines = ingest::lines(tokio::io::stdin());
    loop {
        tokio::select! {
            line = lines.next() => {
                let Some(line) = line else { break };
                match ConsoleCommand::parse(&line?) {
                    Some(ConsoleCommand::Performance) => println!("{}", engine.metrics()),
                    Some(ConsoleCommand::Json) => {
                        println!("{}", serde_json::to_string_pretty(&engine.metrics())?)
                    }
                    Some(ConsoleCommand::Exit) => {
                        println!("Server shutting down...");
                        break;
                    }
                    None => println!("Invalid command. Enter 'P' for performance or 'E' to exit."),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Server shutting down...");
                break;
            }
        }
    }
    Ok(())
}

/// Test harness mode: initial edges until `S`, then `R` on stdout, then one
/// result line per query for every batch ended by `F`.
async fn run_stdin_workload(engine: &GspEngine) -> Result<()> {
    let mut lines = ingest::lines(tokio::io::stdin());
    load_graph(engine, &mut lines).await?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "R")?;
    stdout.flush()?;

    let mut acc = BatchAccumulator::new();
    while let Some(batch) = ingest::next_batch(&mut lines, &mut acc).await? {
        let worker = engine.clone();
        let results = tokio::task::spawn_blocking(move || worker.process_batch(&batch)).await?;

        let mut out = String::new();
        for distance in results {
            writeln!(out, "{}", distance)?;
        }
        stdout.write_all(out.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}
