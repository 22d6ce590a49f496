//! Ship data structures for data-driven ship definitions.

use serde::{Deserialize, Serialize};

use crate::resources::Resources;

/// One rapid-fire table entry.
///
/// Grants the owning ship type `shots` attack opportunities per firing
/// ship against the named target type, where an unlisted pair gets one.
/// Extra shots never trigger further rapid fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RapidFireEntry {
    /// String id of the target ship type.
    pub target: String,
    /// Total shots per firing ship against that target (>= 1).
    pub shots: u32,
}

/// Data-driven ship type definition.
///
/// Defines all properties of a ship type loaded from configuration.
/// Compiled into the [`ShipRegistry`](crate::config::ShipRegistry) at
/// startup; none of these numbers are hardcoded in simulation logic.
///
/// # Example RON
///
/// ```ron
/// ShipData(
///     id: "light_fighter",
///     name: "ship.light_fighter.name",
///     base_speed: 12500,
///     fuel_rate: 20,
///     weapon_power: 50,
///     shield: 10,
///     hull: 400,
///     cargo_capacity: 50,
///     cost: (metal: 3000, crystal: 1000, deuterium: 0),
///     rapid_fire: [
///         (target: "espionage_probe", shots: 5),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipData {
    /// Unique string identifier for this ship type.
    ///
    /// Used for referencing in other data files and for save/load.
    pub id: String,

    /// Localization key for the ship's display name.
    pub name: String,

    /// Base speed in distance units per hour. Must be positive.
    pub base_speed: u32,

    /// Fuel consumption rate (deuterium per unit distance, scaled by
    /// base speed in the fuel formula).
    pub fuel_rate: u32,

    /// Firepower contributed per ship per shot.
    pub weapon_power: u64,

    /// Shield points, regenerated fully each combat round.
    pub shield: u64,

    /// Hull points per ship.
    pub hull: u64,

    /// Cargo capacity in resource units.
    #[serde(default)]
    pub cargo_capacity: u64,

    /// Build cost. Debris yield is computed from the metal and crystal
    /// components only.
    pub cost: Resources,

    /// Whether this ship can found a colony.
    #[serde(default)]
    pub colony_ship: bool,

    /// Whether this ship's cargo capacity counts toward recycling.
    #[serde(default)]
    pub recycler: bool,

    /// Rapid-fire entries against specific target types.
    #[serde(default)]
    pub rapid_fire: Vec<RapidFireEntry>,
}

impl ShipData {
    /// Check if this ship has a rapid-fire entry against a target id.
    #[must_use]
    pub fn rapid_fire_against(&self, target: &str) -> Option<u32> {
        self.rapid_fire
            .iter()
            .find(|entry| entry.target == target)
            .map(|entry| entry.shots)
    }
}
