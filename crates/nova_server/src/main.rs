//! Nova Frontier - headless tick server.
//!
//! ```bash
//! # Run the scheduled ticker
//! cargo run -p nova_server -- serve --ships data/ships.ron --snapshot universe.bin
//!
//! # Apply a single manual tick to a snapshot (same code path)
//! cargo run -p nova_server -- tick --ships data/ships.ron --snapshot universe.bin
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nova_core::simulation::Clock;
use nova_server::{build_simulation, run_ticker, write_snapshot, ServerConfig, SystemClock};

#[derive(Parser)]
#[command(name = "nova_server")]
#[command(about = "Headless tick server for the Nova simulation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduled tick loop
    Serve {
        /// RON ship definitions
        #[arg(long, default_value = "data/ships.ron")]
        ships: PathBuf,

        /// Optional RON game config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Snapshot file to restore from and write back to
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Seconds between ticks
        #[arg(long, default_value = "5")]
        tick_seconds: u64,

        /// Stop after this many ticks (for smoke testing)
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Apply one manual tick and persist the snapshot
    Tick {
        /// RON ship definitions
        #[arg(long, default_value = "data/ships.ron")]
        ships: PathBuf,

        /// Optional RON game config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Snapshot file to restore from and write back to
        #[arg(long)]
        snapshot: PathBuf,

        /// Timestamp to tick at; defaults to the wall clock
        #[arg(long)]
        at: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), nova_server::ServerError> {
    match cli.command {
        Commands::Serve {
            ships,
            config,
            snapshot,
            tick_seconds,
            max_ticks,
        } => {
            let server_config = ServerConfig {
                tick_seconds,
                ships_path: ships,
                config_path: config,
                snapshot_path: snapshot,
                max_ticks,
                ..ServerConfig::default()
            };
            let sim = build_simulation(&server_config)?;
            tracing::info!(tick_seconds, "Starting tick loop");
            run_ticker(sim, server_config, SystemClock).await?;
        }
        Commands::Tick {
            ships,
            config,
            snapshot,
            at,
        } => {
            let server_config = ServerConfig {
                ships_path: ships,
                config_path: config,
                snapshot_path: Some(snapshot),
                ..ServerConfig::default()
            };
            let mut sim = build_simulation(&server_config)?;
            let now = at.unwrap_or_else(|| SystemClock.now());
            let summary = sim.run_tick(now);
            tracing::info!(
                tick = summary.log.tick,
                at = summary.log.at,
                arrivals = summary.log.arrivals,
                battles = summary.log.battles,
                "Manual tick applied"
            );
            write_snapshot(&sim, &server_config)?;
        }
    }
    Ok(())
}
