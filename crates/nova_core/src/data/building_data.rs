//! Building production and energy curves.
//!
//! Curves are data, not code: the production model only evaluates them.
//! `rate(level) = base * level * growth^level`, monotone non-decreasing
//! in the level for any growth >= 1.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_powi, fixed_serde, Fixed};
use crate::planet::BuildingKind;

/// One building's output and energy curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCurve {
    /// Output at the curve base: resource units per hour for producers,
    /// energy supplied for generators.
    pub output_base: u64,
    /// Geometric growth factor applied per level (fixed-point).
    #[serde(with = "fixed_serde")]
    pub output_growth: Fixed,
    /// Energy demanded per hour for producers; unused for generators.
    pub energy_base: u64,
    /// Growth factor for the energy term.
    #[serde(with = "fixed_serde")]
    pub energy_growth: Fixed,
}

impl BuildingCurve {
    /// Evaluate `base * level * growth^level` at a building level.
    #[must_use]
    pub fn evaluate(base: u64, growth: Fixed, level: u32) -> Fixed {
        if level == 0 {
            return Fixed::ZERO;
        }
        Fixed::from_num(base) * Fixed::from_num(level) * fixed_powi(growth, level)
    }

    /// Theoretical output per hour at a level.
    #[must_use]
    pub fn output(&self, level: u32) -> Fixed {
        Self::evaluate(self.output_base, self.output_growth, level)
    }

    /// Energy demand (or supply, for generators) per hour at a level.
    #[must_use]
    pub fn energy(&self, level: u32) -> Fixed {
        Self::evaluate(self.energy_base, self.energy_growth, level)
    }
}

/// Curves for all five building kinds.
///
/// # Example RON
///
/// ```ron
/// BuildingTables(
///     metal_mine: (output_base: 30, output_growth: 4724464025, energy_base: 10, energy_growth: 4724464025),
///     ...
/// )
/// ```
///
/// Growth factors are serialized as raw fixed-point bits, like every
/// other fixed-point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingTables {
    /// Metal mine curve (consumer).
    pub metal_mine: BuildingCurve,
    /// Crystal mine curve (consumer).
    pub crystal_mine: BuildingCurve,
    /// Deuterium synthesizer curve (consumer, possibly exempt).
    pub deuterium_synthesizer: BuildingCurve,
    /// Solar plant curve (generator).
    pub solar_plant: BuildingCurve,
    /// Fusion reactor curve (generator).
    pub fusion_reactor: BuildingCurve,
}

impl BuildingTables {
    /// Get the curve for a building kind.
    #[must_use]
    pub const fn curve(&self, kind: BuildingKind) -> &BuildingCurve {
        match kind {
            BuildingKind::MetalMine => &self.metal_mine,
            BuildingKind::CrystalMine => &self.crystal_mine,
            BuildingKind::DeuteriumSynthesizer => &self.deuterium_synthesizer,
            BuildingKind::SolarPlant => &self.solar_plant,
            BuildingKind::FusionReactor => &self.fusion_reactor,
        }
    }
}

impl Default for BuildingTables {
    fn default() -> Self {
        let growth = Fixed::from_num(11) / Fixed::from_num(10);
        let producer = |output_base: u64, energy_base: u64| BuildingCurve {
            output_base,
            output_growth: growth,
            energy_base,
            energy_growth: growth,
        };
        Self {
            metal_mine: producer(30, 10),
            crystal_mine: producer(20, 10),
            deuterium_synthesizer: producer(10, 20),
            solar_plant: BuildingCurve {
                output_base: 0,
                output_growth: Fixed::ONE,
                energy_base: 20,
                energy_growth: growth,
            },
            fusion_reactor: BuildingCurve {
                output_base: 0,
                output_growth: Fixed::ONE,
                energy_base: 30,
                energy_growth: growth,
            },
        }
    }
}
