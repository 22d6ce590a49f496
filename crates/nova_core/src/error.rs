//! Error types for the simulation core.
//!
//! The taxonomy separates pre-mutation launch validation (recoverable,
//! surfaced to the caller), per-entity resolution failures (logged and
//! skipped by the scheduler), and configuration faults (fatal before
//! the first tick).

use thiserror::Error;

use crate::fleet::FleetId;
use crate::planet::PlanetId;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for state and serialization faults.
#[derive(Debug, Error)]
pub enum SimError {
    /// Referenced planet does not exist.
    #[error("Planet not found: {0}")]
    PlanetNotFound(PlanetId),

    /// Invalid simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),

    /// Configuration failed startup validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Launch validation failures.
///
/// All variants are detected before any state mutation and returned to
/// the caller unchanged; nothing about the fleet or its planets has
/// been touched when one of these surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// The fleet to launch does not exist.
    #[error("Fleet not found: {0}")]
    UnknownFleet(FleetId),

    /// The fleet is not stationed and cannot be sent.
    #[error("Fleet {0} is already on a mission")]
    AlreadyUnderway(FleetId),

    /// A fleet with an all-zero roster cannot fly.
    #[error("Fleet roster is empty")]
    EmptyRoster,

    /// Colonization requires at least one colony ship in the roster.
    #[error("No colony ship in roster")]
    NoColonyShip,

    /// Colonization tech level is below the target's difficulty.
    #[error("Colonization tech {actual} is below required level {required}")]
    ColonizationTechTooLow {
        /// Difficulty of the target coordinate.
        required: u8,
        /// The owner's current colonization tech level.
        actual: u8,
    },

    /// Not enough deuterium at the origin planet to fuel the trip.
    #[error("Insufficient fuel: need {required} deuterium, have {available}")]
    InsufficientFuel {
        /// Deuterium required for the journey.
        required: u64,
        /// Deuterium available at the origin.
        available: u64,
    },

    /// The owner already holds the maximum number of colonies.
    #[error("Colony limit of {limit} reached")]
    ColonyLimitReached {
        /// Configured maximum colonies per owner.
        limit: u32,
    },

    /// The colonization target is already owned at launch time.
    #[error("Destination coordinates are occupied")]
    DestinationOccupied,

    /// The fleet's origin planet does not exist.
    #[error("Origin planet not found: {0}")]
    UnknownOrigin(PlanetId),

    /// The travel destination planet does not exist.
    #[error("Destination planet not found: {0}")]
    UnknownDestination(PlanetId),

    /// A recycling run needs at least one recycler in the roster.
    #[error("No recyclers in roster")]
    NoRecyclers,

    /// The roster references a ship type the registry does not know.
    #[error("Roster references an unknown ship type")]
    UnknownShipType,
}

/// Recall validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecallError {
    /// The fleet to recall does not exist.
    #[error("Fleet not found: {0}")]
    UnknownFleet(FleetId),

    /// Only an outbound fleet can be recalled.
    #[error("Fleet {0} is not on an outbound mission")]
    NotOutbound(FleetId),
}

/// Per-entity failures during tick resolution.
///
/// The scheduler logs these and skips the entity for the tick; the
/// record is retried on the next tick. They never abort a tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A fleet references a destination planet that no longer exists.
    #[error("Fleet {fleet} references missing planet {planet}")]
    MissingPlanet {
        /// The fleet being resolved.
        fleet: FleetId,
        /// The dangling planet reference.
        planet: PlanetId,
    },

    /// A fleet's origin planet no longer exists.
    #[error("Fleet {fleet} has missing origin planet {planet}")]
    MissingOrigin {
        /// The fleet being resolved.
        fleet: FleetId,
        /// The dangling origin reference.
        planet: PlanetId,
    },

    /// A fleet record is malformed (e.g. empty roster mid-flight).
    #[error("Fleet {fleet} record is malformed: {message}")]
    MalformedFleet {
        /// The fleet being resolved.
        fleet: FleetId,
        /// Description of the defect.
        message: String,
    },
}

/// Configuration faults detected at startup validation.
///
/// The system refuses to start rather than silently defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A ship type referenced in data has no stats entry.
    #[error("Missing ship stats for type '{0}'")]
    MissingShipStats(String),

    /// A ship has a non-positive base speed.
    #[error("Ship type '{0}' has zero base speed")]
    ZeroBaseSpeed(String),

    /// A rapid-fire entry references an unknown ship type.
    #[error("Rapid-fire table references unknown ship type '{0}'")]
    UnknownRapidFireTarget(String),

    /// Two ship definitions share the same string id.
    #[error("Duplicate ship type id '{0}'")]
    DuplicateShipId(String),

    /// A global config value is out of its valid range.
    #[error("Invalid config value for {field}: {message}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value is invalid.
        message: String,
    },

    /// A data file failed to parse.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },
}
