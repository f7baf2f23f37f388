//! A full game with every worker in-process.
//!
//! Run with:
//!
//! ```sh
//! cargo run --example local_game -p trio
//! cargo run --example local_game -p trio -- path/to/trio.toml
//! RUST_LOG=trio_coord=debug cargo run --example local_game -p trio
//! ```
//!
//! Without a config file the coordinator runs sequentially with default
//! deadlines. Both players are driven by the same coordinator.

use std::sync::Arc;

use trio::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SystemConfig::load(path)?,
        None => SystemConfig::default(),
    };

    let log = Arc::new(MemorySink::new());
    let telemetry = Arc::new(
        FanoutSink::new()
            .with(Arc::new(TracingSink::new()))
            .with(log.clone()),
    );
    let coordinator = build_coordinator(&config, telemetry)?;

    let mut game = Game::new();
    let outcome = loop {
        let (report, outcome) = coordinator.play_turn(&mut game).await?;
        println!(
            "move {} ({}): {} -> ({}, {}) in {} [{} recovered]",
            report.move_number,
            report.mode,
            report.player,
            report.action.position.row,
            report.action.position.col,
            report.timings.total,
            report.recovered_failures,
        );
        if let Some(decision) = &report.decision {
            println!("  strategist: {}", decision.rationale);
        }
        if outcome.is_decided() {
            break outcome;
        }
    };

    println!("\n{}\n", game.board());
    match outcome {
        GameOutcome::Won { winner } => println!("{winner} wins"),
        GameOutcome::Draw => println!("draw"),
        GameOutcome::InProgress => unreachable!("loop exits on a decided game"),
    }
    println!("{} telemetry events recorded", log.len());
    Ok(())
}
