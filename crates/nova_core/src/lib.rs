//! # Nova Core
//!
//! Deterministic simulation engine for the Nova space-strategy game.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No wall-clock reads (time is injected per tick)
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - A headless ticking server
//! - Reproducible colonization races and battles
//! - Snapshot/restore from bincode
//! - Determinism testing against state hashes
//!
//! ## Crate Structure
//!
//! - [`simulation`] - Tick scheduler and top-level state
//! - [`production`] - Per-planet resource production and energy
//! - [`spatial`] - Distances, travel times, fuel
//! - [`combat`] - Multi-round battle resolution
//! - [`arrival`] - Fleet arrival state machine
//! - [`data`] - RON-loadable ship and building definitions
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod arrival;
pub mod combat;
pub mod config;
pub mod data;
pub mod error;
pub mod fleet;
pub mod math;
pub mod planet;
pub mod production;
pub mod resources;
pub mod simulation;
pub mod spatial;

#[cfg(test)]
pub(crate) mod test_support;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::arrival::ArrivalOutcome;
    pub use crate::combat::{BattleOutcome, BattleSide, CombatReport};
    pub use crate::config::{GameConfig, ShipRegistry, ShipTypeId};
    pub use crate::data::{BuildingTables, ShipData};
    pub use crate::error::{
        LaunchError, RecallError, ResolutionError, Result, SimError,
    };
    pub use crate::fleet::{Fleet, FleetId, Mission, Roster};
    pub use crate::math::Fixed;
    pub use crate::planet::{Coord, OwnerId, Planet, PlanetId, SimTime};
    pub use crate::resources::Resources;
    pub use crate::simulation::{Clock, FleetOrder, Simulation, TickLog, TickSummary};
}
