//! Per-planet resource production with energy throttling.
//!
//! Each tick, every planet gains resources according to its building
//! levels. When energy demand exceeds supply, a uniform efficiency
//! multiplier throttles all consuming buildings; surplus energy gives
//! no bonus. Stock only ever increases in this step.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::math::{fixed_serde, Fixed};
use crate::planet::{BuildingKind, BuildingLevels, Planet};
use crate::resources::Resources;

/// Seconds per production hour; curve rates are per hour.
const SECONDS_PER_HOUR: u64 = 3600;

/// Energy supply, demand and the resulting efficiency multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyBalance {
    /// Energy supplied by generator buildings.
    #[serde(with = "fixed_serde")]
    pub supply: Fixed,
    /// Energy demanded by consuming buildings.
    #[serde(with = "fixed_serde")]
    pub demand: Fixed,
    /// `min(1, supply / demand)` - caps at 1, surplus is not a bonus.
    #[serde(with = "fixed_serde")]
    pub efficiency: Fixed,
}

/// Compute the energy balance for a set of building levels.
#[must_use]
pub fn energy_balance(levels: &BuildingLevels, config: &GameConfig) -> EnergyBalance {
    let tables = &config.buildings;
    let mut supply = Fixed::ZERO;
    let mut demand = Fixed::ZERO;

    for kind in BuildingKind::ALL {
        let energy = tables.curve(kind).energy(levels.level(kind));
        if kind.is_consumer() {
            demand += energy;
        } else {
            supply += energy;
        }
    }

    let efficiency = if demand <= Fixed::ZERO {
        Fixed::ONE
    } else {
        (supply / demand).min(Fixed::ONE)
    };

    EnergyBalance {
        supply,
        demand,
        efficiency,
    }
}

/// What one planet gained in one production step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionDelta {
    /// Whole resource units added to the stock.
    pub gained: Resources,
    /// Efficiency multiplier that was in effect.
    #[serde(with = "fixed_serde")]
    pub efficiency: Fixed,
}

/// Advance a planet's production by `elapsed_secs`.
///
/// Fractional output below one unit is carried on the planet and rolls
/// into the stock once it accumulates; the stock itself never
/// decreases here and never goes negative.
pub fn run_production(
    planet: &mut Planet,
    config: &GameConfig,
    elapsed_secs: u64,
) -> ProductionDelta {
    let balance = energy_balance(&planet.buildings, config);
    let tables = &config.buildings;
    let levels = &planet.buildings;
    let hours = Fixed::from_num(elapsed_secs) / Fixed::from_num(SECONDS_PER_HOUR);

    let metal_rate = tables.metal_mine.output(levels.metal_mine) * balance.efficiency;
    let crystal_rate = tables.crystal_mine.output(levels.crystal_mine) * balance.efficiency;

    // Policy knob: the synthesizer may be exempt from throttling.
    let deuterium_efficiency = if config.deuterium_exempt_from_throttle {
        Fixed::ONE
    } else {
        balance.efficiency
    };
    let deuterium_rate =
        tables.deuterium_synthesizer.output(levels.deuterium_synthesizer) * deuterium_efficiency;

    let (metal, metal_carry) = settle(planet.carry.metal + metal_rate * hours);
    let (crystal, crystal_carry) = settle(planet.carry.crystal + crystal_rate * hours);
    let (deuterium, deuterium_carry) = settle(planet.carry.deuterium + deuterium_rate * hours);

    planet.carry.metal = metal_carry;
    planet.carry.crystal = crystal_carry;
    planet.carry.deuterium = deuterium_carry;

    let gained = Resources::new(metal, crystal, deuterium);
    planet.stock += gained;

    ProductionDelta {
        gained,
        efficiency: balance.efficiency,
    }
}

/// Split an accumulated amount into whole units and the sub-unit carry.
fn settle(accumulated: Fixed) -> (u64, Fixed) {
    let whole = accumulated.floor();
    (whole.to_num::<u64>(), accumulated - whole)
}
