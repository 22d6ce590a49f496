//! Fleets, rosters and mission state.
//!
//! A fleet's mission is a tagged enum, not a status string: the variant
//! is the single source of truth for what the fleet is doing, and it
//! doubles as the arrival resolver's already-processed marker. A fleet
//! that is no longer `Traveling`/`Colonizing`/`Returning`/`Recycling`
//! has been resolved and re-invocation is a no-op.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ShipRegistry, ShipTypeId};
use crate::math::Fixed;
use crate::planet::{Coord, OwnerId, PlanetId, SimTime};
use crate::resources::Resources;

/// Unique identifier for fleets.
pub type FleetId = u64;

/// A fleet's composition: ship type to count.
///
/// A `BTreeMap` so iteration is always in ascending type id order -
/// combat and fuel math depend on deterministic iteration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roster(pub BTreeMap<ShipTypeId, u32>);

impl Roster {
    /// Empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a roster from (type, count) pairs, dropping zero counts.
    #[must_use]
    pub fn from_pairs(pairs: &[(ShipTypeId, u32)]) -> Self {
        let mut roster = Self::new();
        for &(ship_type, count) in pairs {
            if count > 0 {
                *roster.0.entry(ship_type).or_insert(0) += count;
            }
        }
        roster
    }

    /// Count of a ship type (zero when absent).
    #[must_use]
    pub fn count(&self, ship_type: ShipTypeId) -> u32 {
        self.0.get(&ship_type).copied().unwrap_or(0)
    }

    /// Total number of ships.
    #[must_use]
    pub fn total_ships(&self) -> u64 {
        self.0.values().map(|&count| u64::from(count)).sum()
    }

    /// Whether the roster holds no ships at all.
    ///
    /// Zero-count entries do not count; an all-zero roster is
    /// meaningless and must not survive resolution.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|&count| count == 0)
    }

    /// Iterate (type, count) pairs with positive counts, in type order.
    pub fn present(&self) -> impl Iterator<Item = (ShipTypeId, u32)> + '_ {
        self.0
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&ship_type, &count)| (ship_type, count))
    }

    /// Merge another roster into this one.
    pub fn merge(&mut self, other: &Roster) {
        for (ship_type, count) in other.present() {
            *self.0.entry(ship_type).or_insert(0) += count;
        }
    }

    /// Subtract per-type losses, removing entries that reach zero.
    ///
    /// Losses exceeding the present count clamp to zero.
    pub fn apply_losses(&mut self, losses: &BTreeMap<ShipTypeId, u32>) {
        for (ship_type, &lost) in losses {
            if let Some(count) = self.0.get_mut(ship_type) {
                *count = count.saturating_sub(lost);
            }
        }
        self.0.retain(|_, &mut count| count > 0);
    }

    /// Whether any ship in the roster has the colony-ship flag.
    #[must_use]
    pub fn has_colony_ship(&self, registry: &ShipRegistry) -> bool {
        self.present()
            .any(|(ship_type, _)| registry.get(ship_type).is_some_and(|s| s.colony_ship))
    }

    /// Total cargo capacity contributed by recycler-flagged ships.
    #[must_use]
    pub fn recycler_capacity(&self, registry: &ShipRegistry) -> u64 {
        self.present()
            .filter_map(|(ship_type, count)| {
                let stats = registry.get(ship_type)?;
                stats
                    .recycler
                    .then(|| stats.cargo_capacity * u64::from(count))
            })
            .sum()
    }
}

/// What a fleet is currently doing.
///
/// The destination travels with the variant; there is no secondary
/// status string to keep in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mission {
    /// Parked at its origin planet.
    Stationed,
    /// Garrisoned at a friendly planet other than its home.
    Defending {
        /// Planet being defended.
        planet: PlanetId,
    },
    /// Outbound to another planet. A hostile destination means an
    /// attack on arrival, a friendly one a garrison or restationing.
    Traveling {
        /// Destination planet.
        dest: PlanetId,
    },
    /// Outbound to colonize raw coordinates.
    Colonizing {
        /// Target coordinates (no planet id exists yet).
        dest: Coord,
    },
    /// Inbound to the origin planet.
    Returning,
    /// Outbound to harvest a debris field.
    Recycling {
        /// Coordinates of the debris field.
        field: Coord,
    },
}

impl Mission {
    /// Whether this mission has a pending arrival to resolve.
    #[must_use]
    pub const fn is_underway(&self) -> bool {
        matches!(
            self,
            Self::Traveling { .. } | Self::Colonizing { .. } | Self::Returning | Self::Recycling { .. }
        )
    }

    /// Whether this mission is outbound (recallable).
    #[must_use]
    pub const fn is_outbound(&self) -> bool {
        matches!(
            self,
            Self::Traveling { .. } | Self::Colonizing { .. } | Self::Recycling { .. }
        )
    }
}

/// A fleet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    /// Unique identifier.
    pub id: FleetId,
    /// Owning user.
    pub owner: OwnerId,
    /// Ship composition.
    pub roster: Roster,
    /// Planet the fleet launched from and returns to.
    pub origin: PlanetId,
    /// Current mission.
    pub mission: Mission,
    /// Resources carried (mission cargo, recycled debris).
    pub cargo: Resources,
    /// Departure timestamp of the current leg.
    pub departed_at: SimTime,
    /// Arrival timestamp of the current leg.
    pub arrival_at: SimTime,
}

impl Fleet {
    /// Create a stationed fleet at its origin planet.
    #[must_use]
    pub fn stationed(id: FleetId, owner: OwnerId, origin: PlanetId, roster: Roster) -> Self {
        Self {
            id,
            owner,
            roster,
            origin,
            mission: Mission::Stationed,
            cargo: Resources::ZERO,
            departed_at: 0,
            arrival_at: 0,
        }
    }

    /// Duration of the current travel leg in seconds.
    #[must_use]
    pub fn leg_secs(&self) -> SimTime {
        self.arrival_at.saturating_sub(self.departed_at)
    }

    /// Flip the fleet onto a return leg taking `leg_secs` seconds.
    pub fn turn_back(&mut self, now: SimTime, leg_secs: SimTime) {
        self.mission = Mission::Returning;
        self.departed_at = now;
        self.arrival_at = now.saturating_add(leg_secs);
    }

    /// Whether the fleet's travel window has elapsed.
    #[must_use]
    pub fn is_due(&self, now: SimTime) -> bool {
        self.mission.is_underway() && self.arrival_at <= now
    }

    /// Fraction of the current leg completed at `now`, in `[0, 1]`.
    #[must_use]
    pub fn progress_at(&self, now: SimTime) -> Fixed {
        if now >= self.arrival_at {
            return Fixed::ONE;
        }
        if now <= self.departed_at || self.arrival_at <= self.departed_at {
            return Fixed::ZERO;
        }
        let elapsed = Fixed::from_num(now - self.departed_at);
        let window = Fixed::from_num(self.arrival_at - self.departed_at);
        elapsed / window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship_type(id: u32) -> ShipTypeId {
        ShipTypeId::new(id)
    }

    #[test]
    fn test_roster_drops_zero_counts() {
        let roster = Roster::from_pairs(&[(ship_type(0), 5), (ship_type(1), 0)]);
        assert_eq!(roster.count(ship_type(0)), 5);
        assert_eq!(roster.count(ship_type(1)), 0);
        assert_eq!(roster.total_ships(), 5);
        assert!(!roster.is_empty());
    }

    #[test]
    fn test_roster_apply_losses_prunes() {
        let mut roster = Roster::from_pairs(&[(ship_type(0), 10), (ship_type(1), 3)]);
        let mut losses = BTreeMap::new();
        losses.insert(ship_type(0), 4);
        losses.insert(ship_type(1), 99); // Clamp, never underflow

        roster.apply_losses(&losses);
        assert_eq!(roster.count(ship_type(0)), 6);
        assert_eq!(roster.count(ship_type(1)), 0);
        assert!(!roster.0.contains_key(&ship_type(1)));
    }

    #[test]
    fn test_roster_merge() {
        let mut a = Roster::from_pairs(&[(ship_type(0), 2)]);
        let b = Roster::from_pairs(&[(ship_type(0), 3), (ship_type(2), 1)]);
        a.merge(&b);
        assert_eq!(a.count(ship_type(0)), 5);
        assert_eq!(a.count(ship_type(2)), 1);
    }

    #[test]
    fn test_mission_predicates() {
        assert!(!Mission::Stationed.is_underway());
        assert!(Mission::Returning.is_underway());
        assert!(!Mission::Returning.is_outbound());
        assert!(Mission::Traveling { dest: 1 }.is_outbound());
        assert!(Mission::Colonizing {
            dest: Coord::new(1, 2, 3)
        }
        .is_outbound());
        assert!(!Mission::Defending { planet: 1 }.is_underway());
    }

    #[test]
    fn test_progress_fraction() {
        let mut fleet = Fleet::stationed(1, 1, 1, Roster::from_pairs(&[(ship_type(0), 1)]));
        fleet.mission = Mission::Returning;
        fleet.departed_at = 100;
        fleet.arrival_at = 200;

        assert_eq!(fleet.progress_at(100), Fixed::ZERO);
        assert_eq!(fleet.progress_at(150), Fixed::ONE / Fixed::from_num(2));
        assert_eq!(fleet.progress_at(200), Fixed::ONE);
        assert_eq!(fleet.progress_at(999), Fixed::ONE);
        assert!(fleet.is_due(200));
        assert!(!fleet.is_due(199));
    }
}
