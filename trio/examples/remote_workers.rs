//! Three HTTP workers on ephemeral ports, one turn over JSON-RPC.
//!
//! Run with:
//!
//! ```sh
//! cargo run --example remote_workers -p trio
//! ```
//!
//! Each worker is a `WorkerServer` answering `POST /mcp`. The coordinator is
//! wired through [`SystemConfig`] exactly as it would be from a TOML file
//! naming the three URLs, then runs one turn in each mode on a board where
//! O must block.

use std::sync::Arc;

use trio::config::{WorkerConfig, WorkersConfig};
use trio::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let telemetry: Arc<dyn TelemetrySink> = Arc::new(TracingSink::new());

    let mut servers = Vec::new();
    for role in WorkerRole::ALL {
        let endpoint = Arc::new(endpoint_for(role, telemetry.clone())?);
        let server = WorkerServer::bind("127.0.0.1:0", endpoint).await?;
        println!("{role} listening on {}", server.url());
        servers.push(server);
    }

    let workers = WorkersConfig {
        scout: WorkerConfig::remote(servers[0].url()),
        strategist: WorkerConfig::remote(servers[1].url()),
        executor: WorkerConfig::remote(servers[2].url()),
    };

    // X holds (0,0) and (0,1); O to move.
    let mut board = Board::new();
    board.place(Position::new(0, 0), Mark::X)?;
    board.place(Position::new(1, 1), Mark::O)?;
    board.place(Position::new(0, 1), Mark::X)?;
    println!("\n{board}\n");

    for mode in [CoordinationMode::Sequential, CoordinationMode::Parallel] {
        let config = SystemConfig {
            coordinator: CoordinatorConfig::with_mode(mode),
            workers: workers.clone(),
        };
        let coordinator = build_coordinator(&config, telemetry.clone())?;

        let status = coordinator.probe(DurationMs::from_secs(2)).await;
        for worker in &status.workers {
            println!("{}: {:?}", worker.identity, worker.health);
        }

        let report = coordinator.process_turn(&board, Mark::O).await?;
        println!(
            "{mode}: O -> ({}, {}) in {}, {} recovered",
            report.action.position.row,
            report.action.position.col,
            report.timings.total,
            report.recovered_failures,
        );
        for event in &report.trace {
            println!(
                "  {:?} {:?} {:?} {}",
                event.stage, event.outcome, event.substitution, event.duration
            );
        }
    }

    for server in servers {
        server.shutdown().await?;
    }
    Ok(())
}
