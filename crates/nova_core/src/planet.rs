//! Planets, coordinates and shared identifiers.
//!
//! These are pure data types with no behavior beyond small accessors,
//! mutated only by the production model and the arrival resolver.

use serde::{Deserialize, Serialize};

use crate::fleet::Roster;
use crate::math::{fixed_serde, Fixed};
use crate::resources::Resources;

/// Unique identifier for planets.
pub type PlanetId = u64;

/// Unique identifier for fleet/planet owners.
///
/// Users live in an external system; the simulation only carries their
/// id for ownership checks and reporting.
pub type OwnerId = u64;

/// Simulation timestamp in whole seconds.
///
/// The clock is injected by the driver; the core never reads wall time.
pub type SimTime = u64;

/// Integer 3D coordinates of a point in space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coord {
    /// X axis.
    pub x: i32,
    /// Y axis.
    pub y: i32,
    /// Z axis.
    pub z: i32,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Mean of the absolute values of the three axes.
    ///
    /// Integer division rounds down, matching the colonization
    /// difficulty step function.
    #[must_use]
    pub const fn mean_abs(&self) -> i64 {
        (self.x.unsigned_abs() as i64
            + self.y.unsigned_abs() as i64
            + self.z.unsigned_abs() as i64)
            / 3
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}:{}]", self.x, self.y, self.z)
    }
}

/// The five building types that drive production and energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Produces metal; consumes energy.
    MetalMine,
    /// Produces crystal; consumes energy.
    CrystalMine,
    /// Produces deuterium; consumes energy (policy knob may exempt it).
    DeuteriumSynthesizer,
    /// Generates energy.
    SolarPlant,
    /// Generates energy.
    FusionReactor,
}

impl BuildingKind {
    /// All building kinds in a fixed, deterministic order.
    pub const ALL: [Self; 5] = [
        Self::MetalMine,
        Self::CrystalMine,
        Self::DeuteriumSynthesizer,
        Self::SolarPlant,
        Self::FusionReactor,
    ];

    /// Whether this building consumes energy rather than producing it.
    #[must_use]
    pub const fn is_consumer(&self) -> bool {
        matches!(
            self,
            Self::MetalMine | Self::CrystalMine | Self::DeuteriumSynthesizer
        )
    }
}

/// Building levels on a planet.
///
/// Five independent non-negative levels; level 0 means not built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct BuildingLevels {
    /// Metal mine level.
    pub metal_mine: u32,
    /// Crystal mine level.
    pub crystal_mine: u32,
    /// Deuterium synthesizer level.
    pub deuterium_synthesizer: u32,
    /// Solar plant level.
    pub solar_plant: u32,
    /// Fusion reactor level.
    pub fusion_reactor: u32,
}

impl BuildingLevels {
    /// Get the level of a building kind.
    #[must_use]
    pub const fn level(&self, kind: BuildingKind) -> u32 {
        match kind {
            BuildingKind::MetalMine => self.metal_mine,
            BuildingKind::CrystalMine => self.crystal_mine,
            BuildingKind::DeuteriumSynthesizer => self.deuterium_synthesizer,
            BuildingKind::SolarPlant => self.solar_plant,
            BuildingKind::FusionReactor => self.fusion_reactor,
        }
    }
}

/// Sub-unit production progress carried between ticks.
///
/// Stocks are whole units; with short ticks a single tick's output is
/// usually fractional, so the remainder below one unit accumulates
/// here until it rolls over into the stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductionCarry {
    /// Fractional metal below one unit.
    #[serde(with = "fixed_serde")]
    pub metal: Fixed,
    /// Fractional crystal below one unit.
    #[serde(with = "fixed_serde")]
    pub crystal: Fixed,
    /// Fractional deuterium below one unit.
    #[serde(with = "fixed_serde")]
    pub deuterium: Fixed,
}

/// A planet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
    /// Unique identifier.
    pub id: PlanetId,
    /// Location in space.
    pub coord: Coord,
    /// Owning user, if any. Unowned planets exist.
    pub owner: Option<OwnerId>,
    /// Resource stock. Never negative, no hard cap.
    pub stock: Resources,
    /// Building levels.
    pub buildings: BuildingLevels,
    /// Colonization-tech level of the owner, mirrored onto the planet
    /// record at colonization time for launch validation.
    pub colonization_tech: u8,
    /// While set and in the future, the planet was left undefended by
    /// combat and may be claimed by a colonizer despite its owner.
    pub colonization_open_until: Option<SimTime>,
    /// Sub-unit production remainders.
    #[serde(default)]
    pub carry: ProductionCarry,
    /// Stationary defense units. They join the defender side of any
    /// battle at this planet and never move.
    #[serde(default)]
    pub defenses: Roster,
}

impl Planet {
    /// Create an unowned planet at the given coordinates.
    #[must_use]
    pub fn unowned(id: PlanetId, coord: Coord) -> Self {
        Self {
            id,
            coord,
            owner: None,
            stock: Resources::ZERO,
            buildings: BuildingLevels::default(),
            colonization_tech: 0,
            colonization_open_until: None,
            carry: ProductionCarry::default(),
            defenses: Roster::new(),
        }
    }

    /// Whether a colonizer arriving at `now` may claim this planet.
    #[must_use]
    pub fn claimable_at(&self, now: SimTime) -> bool {
        match self.owner {
            None => true,
            Some(_) => self
                .colonization_open_until
                .is_some_and(|deadline| now <= deadline),
        }
    }
}
