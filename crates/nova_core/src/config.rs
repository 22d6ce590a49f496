//! Ship registry and global configuration.
//!
//! Every tunable the simulation reads - ship stats, rapid-fire table,
//! building curves, tick period, speed multiplier, colonization
//! parameters - lives here and is validated once at startup. A missing
//! or invalid entry is a [`ConfigError`] and the system refuses to
//! start rather than silently defaulting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::{BuildingTables, ShipData};
use crate::error::ConfigError;
use crate::math::{fixed_serde, Fixed};
use crate::resources::Resources;

/// Unique identifier for ship types.
///
/// Dense index into the registry, interned from the string id at load
/// time. Orderable so rosters iterate deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ShipTypeId(pub u32);

impl ShipTypeId {
    /// Create a new ship type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Compiled per-type ship stats with rapid-fire targets resolved to ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipStats {
    /// Interned id of this type.
    pub id: ShipTypeId,
    /// Original string id, kept for reports and errors.
    pub name: String,
    /// Base speed in distance units per hour.
    pub base_speed: u32,
    /// Fuel consumption rate.
    pub fuel_rate: u32,
    /// Firepower per ship per shot.
    pub weapon_power: u64,
    /// Shield points, regenerated each round.
    pub shield: u64,
    /// Hull points per ship.
    pub hull: u64,
    /// Cargo capacity in resource units.
    pub cargo_capacity: u64,
    /// Build cost.
    pub cost: Resources,
    /// Whether this ship can found a colony.
    pub colony_ship: bool,
    /// Whether this ship's cargo counts toward recycling.
    pub recycler: bool,
    /// Resolved rapid-fire entries: (target type, shots per firing ship).
    pub rapid_fire: Vec<(ShipTypeId, u32)>,
}

/// Registry of all ship types, built from [`ShipData`] definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipRegistry {
    /// Stats indexed by `ShipTypeId.0`.
    ships: Vec<ShipStats>,
    /// String id to interned id.
    by_name: HashMap<String, ShipTypeId>,
}

impl ShipRegistry {
    /// Compile a registry from raw ship definitions.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on duplicate ids, zero base speed or
    /// rapid-fire entries against unknown types. Validation is fatal:
    /// the caller must not start ticking with a partial registry.
    pub fn from_data(data: &[ShipData]) -> Result<Self, ConfigError> {
        let mut by_name = HashMap::new();
        for (index, ship) in data.iter().enumerate() {
            if ship.base_speed == 0 {
                return Err(ConfigError::ZeroBaseSpeed(ship.id.clone()));
            }
            let id = ShipTypeId::new(index as u32);
            if by_name.insert(ship.id.clone(), id).is_some() {
                return Err(ConfigError::DuplicateShipId(ship.id.clone()));
            }
        }

        let mut ships = Vec::with_capacity(data.len());
        for (index, ship) in data.iter().enumerate() {
            let mut rapid_fire = Vec::with_capacity(ship.rapid_fire.len());
            for entry in &ship.rapid_fire {
                let target = by_name
                    .get(&entry.target)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownRapidFireTarget(entry.target.clone()))?;
                if entry.shots == 0 {
                    return Err(ConfigError::InvalidValue {
                        field: "rapid_fire.shots",
                        message: format!("'{}' vs '{}' must be >= 1", ship.id, entry.target),
                    });
                }
                rapid_fire.push((target, entry.shots));
            }
            ships.push(ShipStats {
                id: ShipTypeId::new(index as u32),
                name: ship.id.clone(),
                base_speed: ship.base_speed,
                fuel_rate: ship.fuel_rate,
                weapon_power: ship.weapon_power,
                shield: ship.shield,
                hull: ship.hull,
                cargo_capacity: ship.cargo_capacity,
                cost: ship.cost,
                colony_ship: ship.colony_ship,
                recycler: ship.recycler,
                rapid_fire,
            });
        }

        Ok(Self { ships, by_name })
    }

    /// Get stats for a ship type.
    #[must_use]
    pub fn get(&self, id: ShipTypeId) -> Option<&ShipStats> {
        self.ships.get(id.0 as usize)
    }

    /// Stats lookup that reports the miss as a configuration fault.
    ///
    /// Simulation code uses this form so a dangling id surfaces as a
    /// [`ConfigError`] instead of panicking mid-tick.
    pub fn stats(&self, id: ShipTypeId) -> Result<&ShipStats, ConfigError> {
        self.get(id)
            .ok_or_else(|| ConfigError::MissingShipStats(format!("#{}", id.0)))
    }

    /// Look up a type id by its string id.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ShipTypeId> {
        self.by_name.get(name).copied()
    }

    /// Shots per firing ship of `attacker` type against `target` type.
    ///
    /// Unlisted pairs get a single shot. Extra shots are a flat
    /// multiplier applied once per round - never recursive.
    #[must_use]
    pub fn shots_against(&self, attacker: ShipTypeId, target: ShipTypeId) -> u32 {
        self.get(attacker)
            .and_then(|stats| {
                stats
                    .rapid_fire
                    .iter()
                    .find(|(t, _)| *t == target)
                    .map(|(_, shots)| *shots)
            })
            .unwrap_or(1)
    }

    /// Number of registered ship types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ships.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Iterate over all ship stats in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ShipStats> {
        self.ships.iter()
    }
}

/// Global simulation configuration.
///
/// Balancing constants are configuration, not code; the defaults here
/// exist for tests and local play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Tick period in seconds.
    pub tick_seconds: u32,
    /// Universe speed multiplier applied to travel times.
    #[serde(with = "fixed_serde")]
    pub speed_multiplier: Fixed,
    /// Percentage of destroyed ships' metal+crystal cost left as debris.
    pub debris_percent: u64,
    /// Maximum combat rounds before the defender wins by default.
    pub max_combat_rounds: u32,
    /// Seconds a planet stays claimable after its defenders are wiped.
    pub colonization_window_secs: u64,
    /// Resources seeded onto a freshly founded colony.
    pub colony_starting_resources: Resources,
    /// Maximum colonies per owner.
    pub colony_limit: u32,
    /// When set, the deuterium synthesizer ignores energy throttling.
    pub deuterium_exempt_from_throttle: bool,
    /// Building production and energy curves.
    pub buildings: BuildingTables,
}

impl GameConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found. Callers must treat any
    /// error as fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_seconds",
                message: "must be positive".to_string(),
            });
        }
        if self.speed_multiplier <= Fixed::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "speed_multiplier",
                message: "must be positive".to_string(),
            });
        }
        if self.debris_percent > 100 {
            return Err(ConfigError::InvalidValue {
                field: "debris_percent",
                message: format!("{} exceeds 100", self.debris_percent),
            });
        }
        if self.max_combat_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_combat_rounds",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 5,
            speed_multiplier: Fixed::ONE,
            debris_percent: 30,
            max_combat_rounds: 6,
            colonization_window_secs: 3600,
            colony_starting_resources: Resources::new(500, 500, 0),
            colony_limit: 9,
            deuterium_exempt_from_throttle: false,
            buildings: BuildingTables::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RapidFireEntry;

    fn ship(id: &str, speed: u32) -> ShipData {
        ShipData {
            id: id.to_string(),
            name: format!("ship.{id}.name"),
            base_speed: speed,
            fuel_rate: 20,
            weapon_power: 50,
            shield: 10,
            hull: 400,
            cargo_capacity: 50,
            cost: Resources::new(3000, 1000, 0),
            colony_ship: false,
            recycler: false,
            rapid_fire: Vec::new(),
        }
    }

    #[test]
    fn test_registry_interning() {
        let registry =
            ShipRegistry::from_data(&[ship("light_fighter", 12_500), ship("cruiser", 15_000)])
                .unwrap();

        let lf = registry.id_of("light_fighter").unwrap();
        let cruiser = registry.id_of("cruiser").unwrap();
        assert_ne!(lf, cruiser);
        assert_eq!(registry.get(lf).unwrap().name, "light_fighter");
        assert_eq!(registry.len(), 2);
        assert!(registry.id_of("battleship").is_none());
    }

    #[test]
    fn test_registry_rejects_zero_speed() {
        let err = ShipRegistry::from_data(&[ship("probe", 0)]).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroBaseSpeed(id) if id == "probe"));
    }

    #[test]
    fn test_registry_rejects_duplicate_id() {
        let err =
            ShipRegistry::from_data(&[ship("cruiser", 100), ship("cruiser", 200)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateShipId(id) if id == "cruiser"));
    }

    #[test]
    fn test_registry_rejects_unknown_rapid_fire_target() {
        let mut cruiser = ship("cruiser", 15_000);
        cruiser.rapid_fire.push(RapidFireEntry {
            target: "no_such_ship".to_string(),
            shots: 6,
        });
        let err = ShipRegistry::from_data(&[cruiser]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRapidFireTarget(t) if t == "no_such_ship"));
    }

    #[test]
    fn test_shots_against_defaults_to_one() {
        let mut cruiser = ship("cruiser", 15_000);
        cruiser.rapid_fire.push(RapidFireEntry {
            target: "light_fighter".to_string(),
            shots: 6,
        });
        let registry =
            ShipRegistry::from_data(&[ship("light_fighter", 12_500), cruiser]).unwrap();

        let lf = registry.id_of("light_fighter").unwrap();
        let cr = registry.id_of("cruiser").unwrap();
        assert_eq!(registry.shots_against(cr, lf), 6);
        assert_eq!(registry.shots_against(lf, cr), 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(GameConfig::default().validate().is_ok());

        let mut config = GameConfig::default();
        config.tick_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.debris_percent = 101;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.speed_multiplier = Fixed::ZERO;
        assert!(config.validate().is_err());
    }
}
