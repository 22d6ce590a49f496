//! # Nova Tick Server
//!
//! Headless driver for the deterministic simulation core.
//!
//! The core never reads the wall clock; this crate owns the boundary:
//! it loads RON data files, builds the [`Simulation`], and feeds it
//! timestamps from a [`SystemClock`] on a fixed tokio interval.
//! Manual admin ticks go through the exact same [`Simulation::run_tick`]
//! call as scheduled ones.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use nova_core::config::{GameConfig, ShipRegistry};
use nova_core::data::ShipData;
use nova_core::planet::SimTime;
use nova_core::simulation::{Clock, Simulation};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Seconds between scheduled ticks.
    pub tick_seconds: u64,
    /// Path to the RON ship definitions.
    pub ships_path: PathBuf,
    /// Optional path to a RON game config; defaults apply when absent.
    pub config_path: Option<PathBuf>,
    /// Snapshot file, loaded at startup and rewritten periodically.
    pub snapshot_path: Option<PathBuf>,
    /// Write a snapshot every this many ticks.
    pub snapshot_every: u64,
    /// Stop after this many ticks (`None` runs forever).
    pub max_ticks: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_seconds: u64::from(GameConfig::default().tick_seconds),
            ships_path: PathBuf::from("data/ships.ron"),
            config_path: None,
            snapshot_path: None,
            snapshot_every: 120,
            max_ticks: None,
        }
    }
}

/// Errors at the server boundary.
#[derive(Debug, Error)]
pub enum ServerError {
    /// File IO failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A RON data file did not parse.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// Parser diagnostics.
        message: String,
    },

    /// The simulation rejected the state or configuration.
    #[error(transparent)]
    Sim(#[from] nova_core::error::SimError),
}

/// Wall-clock time source, in whole seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SimTime {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// Load ship definitions from a RON file.
///
/// # Errors
///
/// Returns [`ServerError`] on IO or parse failure.
pub fn load_ship_data(path: &Path) -> Result<Vec<ShipData>, ServerError> {
    let text = std::fs::read_to_string(path)?;
    ron::from_str(&text).map_err(|e| ServerError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a game config from a RON file.
///
/// # Errors
///
/// Returns [`ServerError`] on IO or parse failure.
pub fn load_game_config(path: &Path) -> Result<GameConfig, ServerError> {
    let text = std::fs::read_to_string(path)?;
    ron::from_str(&text).map_err(|e| ServerError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Build a simulation from the configured data files, restoring from
/// the snapshot when one exists.
///
/// # Errors
///
/// Returns [`ServerError`] if data files fail to load or the snapshot
/// does not decode.
pub fn build_simulation(config: &ServerConfig) -> Result<Simulation, ServerError> {
    if let Some(snapshot) = &config.snapshot_path {
        if snapshot.exists() {
            let bytes = std::fs::read(snapshot)?;
            let sim = Simulation::deserialize(&bytes)?;
            tracing::info!(
                path = %snapshot.display(),
                tick = sim.current_tick(),
                "Restored simulation from snapshot"
            );
            return Ok(sim);
        }
    }

    let ships = load_ship_data(&config.ships_path)?;
    let registry = ShipRegistry::from_data(&ships).map_err(nova_core::error::SimError::from)?;
    let game_config = match &config.config_path {
        Some(path) => load_game_config(path)?,
        None => GameConfig::default(),
    };
    tracing::info!(
        ships = registry.len(),
        tick_seconds = game_config.tick_seconds,
        "Built fresh simulation"
    );
    Ok(Simulation::new(game_config, registry)?)
}

/// Write a snapshot if the config names a path.
///
/// # Errors
///
/// Returns [`ServerError`] on serialization or IO failure.
pub fn write_snapshot(sim: &Simulation, config: &ServerConfig) -> Result<(), ServerError> {
    if let Some(path) = &config.snapshot_path {
        let bytes = sim.serialize()?;
        std::fs::write(path, bytes)?;
        tracing::debug!(path = %path.display(), tick = sim.current_tick(), "Snapshot written");
    }
    Ok(())
}

/// Drive the simulation off the scheduled interval until `max_ticks`
/// is reached (or forever).
///
/// # Errors
///
/// Returns [`ServerError`] if a snapshot write fails.
pub async fn run_ticker(
    mut sim: Simulation,
    config: ServerConfig,
    clock: impl Clock,
) -> Result<Simulation, ServerError> {
    let mut interval = tokio::time::interval(Duration::from_secs(config.tick_seconds.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut ticks_run = 0u64;
    loop {
        interval.tick().await;
        let now = clock.now();
        let summary = sim.run_tick(now);
        tracing::info!(
            tick = summary.log.tick,
            at = summary.log.at,
            arrivals = summary.log.arrivals,
            battles = summary.log.battles,
            errors = summary.log.errors,
            "Tick complete"
        );

        ticks_run += 1;
        if summary.log.tick % config.snapshot_every.max(1) == 0 {
            write_snapshot(&sim, &config)?;
        }
        if config.max_ticks.is_some_and(|max| ticks_run >= max) {
            write_snapshot(&sim, &config)?;
            return Ok(sim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_test_utils::fixtures;

    /// Fake clock stepping a fixed stride per call.
    struct SteppingClock {
        start: SimTime,
        stride: SimTime,
        calls: std::cell::Cell<u64>,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> SimTime {
            let n = self.calls.get();
            self.calls.set(n + 1);
            self.start + n * self.stride
        }
    }

    #[tokio::test]
    async fn test_ticker_advances_simulation() {
        let sim = fixtures::test_simulation();
        let config = ServerConfig {
            tick_seconds: 1,
            max_ticks: Some(3),
            snapshot_path: None,
            ..ServerConfig::default()
        };
        let clock = SteppingClock {
            start: 1_000,
            stride: 5,
            calls: std::cell::Cell::new(0),
        };

        let sim = run_ticker(sim, config, clock).await.unwrap();
        assert_eq!(sim.current_tick(), 3);
        assert_eq!(sim.tick_log().len(), 3);
        assert_eq!(sim.tick_log()[2].at, 1_010);
    }

    #[test]
    fn test_ship_data_file_parses() {
        let ships =
            load_ship_data(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/ships.ron")))
                .unwrap();
        let registry = ShipRegistry::from_data(&ships).unwrap();
        assert!(registry.id_of("light_fighter").is_some());
        assert!(registry.id_of("colony_ship").is_some());
        assert!(registry.id_of("recycler").is_some());
    }
}
