//! Fleet arrival resolution.
//!
//! Every fleet whose travel window has elapsed goes through
//! [`resolve_arrival`] exactly once. The mission tag is the persisted
//! already-processed marker: resolution always rewrites it before
//! returning, so re-invoking the resolver on the same fleet (same tick
//! or after a crash and replay) is a no-op and never duplicates a
//! resource transfer or a colony.
//!
//! Ordering is the caller's job. The tick scheduler feeds fleets in by
//! ascending (arrival time, fleet id), which is what makes same-tick
//! colonization races deterministic: the first claim in that order
//! wins, later claimants turn around.

use std::collections::BTreeMap;

use crate::combat::{resolve_battle, BattleOutcome};
use crate::config::{GameConfig, ShipRegistry};
use crate::error::ResolutionError;
use crate::fleet::{Fleet, FleetId, Mission, Roster};
use crate::planet::{Coord, OwnerId, Planet, PlanetId, SimTime};
use crate::resources::Resources;

/// Mutable view of the simulation state an arrival may touch.
///
/// Borrowed field-by-field from the simulation so the resolver can
/// mutate planets, fleets and debris independently.
pub(crate) struct ResolverCtx<'a> {
    /// All planets, by id.
    pub planets: &'a mut BTreeMap<PlanetId, Planet>,
    /// All fleets, by id.
    pub fleets: &'a mut BTreeMap<FleetId, Fleet>,
    /// Debris fields, by coordinate. Entries persist at zero.
    pub debris: &'a mut BTreeMap<Coord, Resources>,
    /// Id source for colonies founded at raw coordinates.
    pub next_planet_id: &'a mut PlanetId,
    /// Compiled ship stats.
    pub registry: &'a ShipRegistry,
    /// Game rules.
    pub config: &'a GameConfig,
    /// Injected current time.
    pub now: SimTime,
}

/// What resolving one fleet did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalOutcome {
    /// The fleet's mission tag was no longer underway. No-op.
    AlreadyResolved,
    /// The fleet's travel window has not elapsed yet. No-op.
    NotDue,
    /// A colony was founded and the fleet stationed there.
    ColonyFounded {
        /// The claimed (or newly created) planet.
        planet: PlanetId,
    },
    /// The target was taken first; the fleet turned for home.
    ColonizationReverted,
    /// The fleet reinforced a friendly planet.
    Deployed {
        /// The planet the fleet now sits at.
        planet: PlanetId,
    },
    /// A battle was fought at the destination.
    Battle {
        /// The attacked planet.
        planet: PlanetId,
        /// Where the battle took place.
        location: Coord,
        /// Owner of the attacking fleet.
        attacker: OwnerId,
        /// Owner of the attacked planet, if any.
        defender: Option<OwnerId>,
        /// Full battle result.
        outcome: BattleOutcome,
    },
    /// The fleet arrived home and is stationed again.
    Returned {
        /// The origin planet.
        planet: PlanetId,
    },
    /// Debris was harvested and the fleet turned for home.
    Recycled {
        /// The harvested field.
        field: Coord,
        /// What was loaded into the cargo hold.
        collected: Resources,
    },
}

/// Resolve one due fleet. Idempotent per the mission-tag marker.
pub(crate) fn resolve_arrival(
    ctx: &mut ResolverCtx<'_>,
    fleet_id: FleetId,
) -> Result<ArrivalOutcome, ResolutionError> {
    let Some(fleet) = ctx.fleets.get(&fleet_id) else {
        return Err(ResolutionError::MalformedFleet {
            fleet: fleet_id,
            message: "fleet disappeared during resolution".to_owned(),
        });
    };
    if !fleet.mission.is_underway() {
        return Ok(ArrivalOutcome::AlreadyResolved);
    }
    if !fleet.is_due(ctx.now) {
        return Ok(ArrivalOutcome::NotDue);
    }
    if fleet.roster.is_empty() {
        // Should have been rejected at launch; drop the husk.
        ctx.fleets.remove(&fleet_id);
        return Err(ResolutionError::MalformedFleet {
            fleet: fleet_id,
            message: "underway fleet with empty roster".to_owned(),
        });
    }

    match fleet.mission {
        Mission::Traveling { dest } => resolve_travel(ctx, fleet_id, dest),
        Mission::Colonizing { dest } => resolve_colonize(ctx, fleet_id, dest),
        Mission::Returning => resolve_return(ctx, fleet_id),
        Mission::Recycling { field } => resolve_recycle(ctx, fleet_id, field),
        Mission::Stationed | Mission::Defending { .. } => Ok(ArrivalOutcome::AlreadyResolved),
    }
}

/// An attack on a hostile planet, or a deployment to a friendly one.
fn resolve_travel(
    ctx: &mut ResolverCtx<'_>,
    fleet_id: FleetId,
    dest: PlanetId,
) -> Result<ArrivalOutcome, ResolutionError> {
    if !ctx.planets.contains_key(&dest) {
        return Err(ResolutionError::MissingPlanet {
            fleet: fleet_id,
            planet: dest,
        });
    }
    let owner = ctx
        .fleets
        .get(&fleet_id)
        .map(|f| f.owner)
        .ok_or_else(|| ResolutionError::MalformedFleet {
            fleet: fleet_id,
            message: "fleet disappeared during resolution".to_owned(),
        })?;
    let planet_owner = ctx.planets[&dest].owner;

    if planet_owner == Some(owner) {
        // Friendly destination: garrison there, drop cargo off. The
        // fleet keeps its home planet and joins the defender side of
        // any battle at the garrisoned one.
        let fleet = fleet_mut(ctx, fleet_id)?;
        let cargo = std::mem::take(&mut fleet.cargo);
        fleet.mission = if fleet.origin == dest {
            Mission::Stationed
        } else {
            Mission::Defending { planet: dest }
        };
        if let Some(planet) = ctx.planets.get_mut(&dest) {
            planet.stock += cargo;
        }
        return Ok(ArrivalOutcome::Deployed { planet: dest });
    }

    resolve_attack(ctx, fleet_id, dest)
}

fn resolve_attack(
    ctx: &mut ResolverCtx<'_>,
    fleet_id: FleetId,
    dest: PlanetId,
) -> Result<ArrivalOutcome, ResolutionError> {
    let (attacker_owner, attacker_roster) = {
        let fleet = fleet_mut(ctx, fleet_id)?;
        (fleet.owner, fleet.roster.clone())
    };

    // Defenders: the planet owner's fleets parked at the planet, in
    // ascending fleet id order, plus the stationary defenses.
    let (location, planet_owner, defenses) = {
        let planet = &ctx.planets[&dest];
        (planet.coord, planet.owner, planet.defenses.clone())
    };
    let defender_ids: Vec<FleetId> = ctx
        .fleets
        .iter()
        .filter(|(&id, f)| {
            id != fleet_id
                && Some(f.owner) == planet_owner
                && matches!(
                    f.mission,
                    Mission::Stationed | Mission::Defending { .. }
                )
                && fleet_location(f) == Some(dest)
        })
        .map(|(&id, _)| id)
        .collect();

    let mut merged = Roster::new();
    for &id in &defender_ids {
        if let Some(defender) = ctx.fleets.get(&id) {
            merged.merge(&defender.roster);
        }
    }

    let planet_defenses = (!defenses.is_empty()).then_some(&defenses);
    let outcome = resolve_battle(
        &attacker_roster,
        &merged,
        planet_defenses,
        ctx.registry,
        ctx.config,
    )
    .map_err(|err| ResolutionError::MalformedFleet {
        fleet: fleet_id,
        message: err.to_string(),
    })?;

    // Defender losses land on contributors in the same fixed order the
    // rosters were merged in: fleets ascending by id, defenses last.
    for (&ship_type, &lost) in &outcome.defender_losses {
        let mut remaining = lost;
        for &id in &defender_ids {
            if remaining == 0 {
                break;
            }
            if let Some(defender) = ctx.fleets.get_mut(&id) {
                let have = defender.roster.count(ship_type);
                let taken = have.min(remaining);
                if taken > 0 {
                    let mut losses = BTreeMap::new();
                    losses.insert(ship_type, taken);
                    defender.roster.apply_losses(&losses);
                    remaining -= taken;
                }
            }
        }
        if remaining > 0 {
            if let Some(planet) = ctx.planets.get_mut(&dest) {
                let mut losses = BTreeMap::new();
                losses.insert(ship_type, remaining);
                planet.defenses.apply_losses(&losses);
            }
        }
    }
    // Fully destroyed defenders do not survive as empty husks.
    for &id in &defender_ids {
        if ctx.fleets.get(&id).is_some_and(|f| f.roster.is_empty()) {
            ctx.fleets.remove(&id);
        }
    }

    if !outcome.debris.is_empty() {
        *ctx.debris.entry(location).or_insert(Resources::ZERO) += outcome.debris;
    }

    if outcome.defender_wiped() && planet_owner.is_some() {
        if let Some(planet) = ctx.planets.get_mut(&dest) {
            planet.colonization_open_until =
                Some(ctx.now.saturating_add(ctx.config.colonization_window_secs));
        }
    }

    // The attacker either died on the field or turns for home.
    let now = ctx.now;
    let fleet = fleet_mut(ctx, fleet_id)?;
    fleet.roster.apply_losses(&outcome.attacker_losses);
    if fleet.roster.is_empty() {
        ctx.fleets.remove(&fleet_id);
    } else {
        let leg = fleet.leg_secs();
        fleet.turn_back(now, leg);
    }

    Ok(ArrivalOutcome::Battle {
        planet: dest,
        location,
        attacker: attacker_owner,
        defender: planet_owner,
        outcome,
    })
}

/// Claim the target coordinates, or turn back if someone got there
/// first. First arrival wins by the caller's processing order.
fn resolve_colonize(
    ctx: &mut ResolverCtx<'_>,
    fleet_id: FleetId,
    dest: Coord,
) -> Result<ArrivalOutcome, ResolutionError> {
    let owner = fleet_mut(ctx, fleet_id)?.owner;
    let origin = fleet_mut(ctx, fleet_id)?.origin;
    let origin_tech = ctx
        .planets
        .get(&origin)
        .map_or(0, |planet| planet.colonization_tech);

    let existing = ctx
        .planets
        .values()
        .find(|planet| planet.coord == dest)
        .map(|planet| (planet.id, planet.claimable_at(ctx.now)));

    let planet_id = match existing {
        Some((id, true)) => id,
        Some((_, false)) => {
            // Lost the race. Silent symmetric return, not an error.
            let now = ctx.now;
            let fleet = fleet_mut(ctx, fleet_id)?;
            let leg = fleet.leg_secs();
            fleet.turn_back(now, leg);
            return Ok(ArrivalOutcome::ColonizationReverted);
        }
        None => {
            let id = *ctx.next_planet_id;
            *ctx.next_planet_id += 1;
            ctx.planets.insert(id, Planet::unowned(id, dest));
            id
        }
    };

    let (cargo, seed) = {
        let fleet = fleet_mut(ctx, fleet_id)?;
        let cargo = std::mem::take(&mut fleet.cargo);
        fleet.origin = planet_id;
        fleet.mission = Mission::Stationed;
        (cargo, ctx.config.colony_starting_resources)
    };
    if let Some(planet) = ctx.planets.get_mut(&planet_id) {
        planet.owner = Some(owner);
        planet.colonization_tech = origin_tech;
        planet.colonization_open_until = None;
        planet.stock += seed;
        planet.stock += cargo;
    }

    Ok(ArrivalOutcome::ColonyFounded { planet: planet_id })
}

/// Merge the homecoming fleet back into the origin planet.
fn resolve_return(
    ctx: &mut ResolverCtx<'_>,
    fleet_id: FleetId,
) -> Result<ArrivalOutcome, ResolutionError> {
    let origin = fleet_mut(ctx, fleet_id)?.origin;
    if !ctx.planets.contains_key(&origin) {
        return Err(ResolutionError::MissingOrigin {
            fleet: fleet_id,
            planet: origin,
        });
    }

    let (owner, cargo) = {
        let fleet = fleet_mut(ctx, fleet_id)?;
        let cargo = std::mem::take(&mut fleet.cargo);
        fleet.mission = Mission::Stationed;
        (fleet.owner, cargo)
    };
    if let Some(planet) = ctx.planets.get_mut(&origin) {
        planet.stock += cargo;
    }

    // Fold into the oldest stationed fleet already parked there, if
    // one exists, so stationed fleets do not fragment endlessly.
    let anchor = ctx
        .fleets
        .iter()
        .filter(|(&id, f)| {
            id != fleet_id
                && f.owner == owner
                && f.origin == origin
                && matches!(f.mission, Mission::Stationed)
        })
        .map(|(&id, _)| id)
        .next();
    if let Some(anchor_id) = anchor {
        let roster = fleet_mut(ctx, fleet_id)?.roster.clone();
        if let Some(anchor_fleet) = ctx.fleets.get_mut(&anchor_id) {
            anchor_fleet.roster.merge(&roster);
        }
        ctx.fleets.remove(&fleet_id);
    }

    Ok(ArrivalOutcome::Returned { planet: origin })
}

/// Load debris into the recyclers' shared cargo capacity and turn for
/// home. The field record persists even when drained to zero.
fn resolve_recycle(
    ctx: &mut ResolverCtx<'_>,
    fleet_id: FleetId,
    field: Coord,
) -> Result<ArrivalOutcome, ResolutionError> {
    let registry = ctx.registry;
    let (capacity, held) = {
        let fleet = fleet_mut(ctx, fleet_id)?;
        (
            fleet.roster.recycler_capacity(registry),
            fleet.cargo.total(),
        )
    };
    let free = capacity.saturating_sub(held);

    let entry = ctx.debris.entry(field).or_insert(Resources::ZERO);
    let collected = entry.drain_up_to(free);

    let now = ctx.now;
    let fleet = fleet_mut(ctx, fleet_id)?;
    fleet.cargo += collected;
    let leg = fleet.leg_secs();
    fleet.turn_back(now, leg);

    Ok(ArrivalOutcome::Recycled { field, collected })
}

/// Where a parked fleet currently sits.
fn fleet_location(fleet: &Fleet) -> Option<PlanetId> {
    match fleet.mission {
        Mission::Stationed => Some(fleet.origin),
        Mission::Defending { planet } => Some(planet),
        _ => None,
    }
}

fn fleet_mut<'a>(
    ctx: &'a mut ResolverCtx<'_>,
    fleet_id: FleetId,
) -> Result<&'a mut Fleet, ResolutionError> {
    ctx.fleets
        .get_mut(&fleet_id)
        .ok_or_else(|| ResolutionError::MalformedFleet {
            fleet: fleet_id,
            message: "fleet disappeared during resolution".to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support as fixtures;

    struct World {
        planets: BTreeMap<PlanetId, Planet>,
        fleets: BTreeMap<FleetId, Fleet>,
        debris: BTreeMap<Coord, Resources>,
        next_planet_id: PlanetId,
        registry: ShipRegistry,
        config: GameConfig,
    }

    impl World {
        fn new() -> Self {
            Self {
                planets: BTreeMap::new(),
                fleets: BTreeMap::new(),
                debris: BTreeMap::new(),
                next_planet_id: 1000,
                registry: fixtures::test_registry(),
                config: GameConfig::default(),
            }
        }

        fn resolve(&mut self, fleet_id: FleetId, now: SimTime) -> ArrivalOutcome {
            let mut ctx = ResolverCtx {
                planets: &mut self.planets,
                fleets: &mut self.fleets,
                debris: &mut self.debris,
                next_planet_id: &mut self.next_planet_id,
                registry: &self.registry,
                config: &self.config,
                now,
            };
            resolve_arrival(&mut ctx, fleet_id).unwrap()
        }
    }

    fn colonizer(world: &World, id: FleetId, owner: OwnerId, dest: Coord) -> Fleet {
        let colony_ship = world.registry.id_of("colony_ship").unwrap();
        let mut fleet = Fleet::stationed(id, owner, 1, Roster::from_pairs(&[(colony_ship, 1)]));
        fleet.mission = Mission::Colonizing { dest };
        fleet.departed_at = 0;
        fleet.arrival_at = 100;
        fleet
    }

    #[test]
    fn test_colonize_founds_colony_at_empty_coords() {
        let mut world = World::new();
        world.planets.insert(1, Planet::unowned(1, Coord::new(0, 0, 0)));
        let dest = Coord::new(10, 20, 30);
        world.fleets.insert(7, colonizer(&world, 7, 42, dest));

        let outcome = world.resolve(7, 100);
        let ArrivalOutcome::ColonyFounded { planet } = outcome else {
            panic!("expected a colony, got {outcome:?}");
        };

        let colony = &world.planets[&planet];
        assert_eq!(colony.owner, Some(42));
        assert_eq!(colony.coord, dest);
        assert_eq!(colony.stock, world.config.colony_starting_resources);
        let fleet = &world.fleets[&7];
        assert_eq!(fleet.mission, Mission::Stationed);
        assert_eq!(fleet.origin, planet);
    }

    #[test]
    fn test_colonization_race_first_wins_second_reverts() {
        let mut world = World::new();
        world.planets.insert(1, Planet::unowned(1, Coord::new(0, 0, 0)));
        let dest = Coord::new(10, 20, 30);
        world.fleets.insert(3, colonizer(&world, 3, 42, dest));
        world.fleets.insert(5, colonizer(&world, 5, 99, dest));

        // Caller order stands in for the tick's (arrival, id) order
        let first = world.resolve(3, 100);
        let second = world.resolve(5, 100);

        assert!(matches!(first, ArrivalOutcome::ColonyFounded { .. }));
        assert_eq!(second, ArrivalOutcome::ColonizationReverted);
        let loser = &world.fleets[&5];
        assert_eq!(loser.mission, Mission::Returning);
        // Symmetric return leg
        assert_eq!(loser.arrival_at - loser.departed_at, 100);
        let colony = world.planets.values().find(|p| p.coord == dest).unwrap();
        assert_eq!(colony.owner, Some(42));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut world = World::new();
        world.planets.insert(1, Planet::unowned(1, Coord::new(0, 0, 0)));
        let dest = Coord::new(10, 20, 30);
        world.fleets.insert(7, colonizer(&world, 7, 42, dest));

        assert!(matches!(
            world.resolve(7, 100),
            ArrivalOutcome::ColonyFounded { .. }
        ));
        let snapshot = (world.planets.clone(), world.fleets.clone());

        // Same fleet again in the same tick: marker short-circuits
        assert_eq!(world.resolve(7, 100), ArrivalOutcome::AlreadyResolved);
        assert_eq!(snapshot, (world.planets.clone(), world.fleets.clone()));
    }

    #[test]
    fn test_return_deposits_cargo_and_merges() {
        let mut world = World::new();
        let lf = world.registry.id_of("light_fighter").unwrap();
        let mut home = Planet::unowned(1, Coord::new(0, 0, 0));
        home.owner = Some(42);
        world.planets.insert(1, home);

        world
            .fleets
            .insert(2, Fleet::stationed(2, 42, 1, Roster::from_pairs(&[(lf, 5)])));
        let mut inbound = Fleet::stationed(9, 42, 1, Roster::from_pairs(&[(lf, 3)]));
        inbound.mission = Mission::Returning;
        inbound.cargo = Resources::new(100, 50, 0);
        inbound.arrival_at = 60;
        world.fleets.insert(9, inbound);

        assert_eq!(
            world.resolve(9, 60),
            ArrivalOutcome::Returned { planet: 1 }
        );
        assert_eq!(world.planets[&1].stock, Resources::new(100, 50, 0));
        // Folded into the stationed fleet
        assert!(!world.fleets.contains_key(&9));
        assert_eq!(world.fleets[&2].roster.count(lf), 8);
    }

    #[test]
    fn test_travel_to_second_own_planet_garrisons() {
        let mut world = World::new();
        let lf = world.registry.id_of("light_fighter").unwrap();
        let mut home = Planet::unowned(1, Coord::new(0, 0, 0));
        home.owner = Some(42);
        world.planets.insert(1, home);
        let mut outpost = Planet::unowned(2, Coord::new(10, 0, 0));
        outpost.owner = Some(42);
        world.planets.insert(2, outpost);

        let mut fleet = Fleet::stationed(7, 42, 1, Roster::from_pairs(&[(lf, 5)]));
        fleet.mission = Mission::Traveling { dest: 2 };
        fleet.cargo = Resources::new(500, 0, 0);
        fleet.arrival_at = 80;
        world.fleets.insert(7, fleet);

        assert_eq!(world.resolve(7, 80), ArrivalOutcome::Deployed { planet: 2 });
        let garrison = &world.fleets[&7];
        assert_eq!(garrison.mission, Mission::Defending { planet: 2 });
        // Home planet is unchanged, cargo lands at the outpost
        assert_eq!(garrison.origin, 1);
        assert_eq!(garrison.cargo, Resources::ZERO);
        assert_eq!(world.planets[&2].stock.metal, 500);

        // Heading back home parks the fleet as plain stationed again
        let fleet = world.fleets.get_mut(&7).unwrap();
        fleet.mission = Mission::Traveling { dest: 1 };
        fleet.arrival_at = 160;
        assert_eq!(world.resolve(7, 160), ArrivalOutcome::Deployed { planet: 1 });
        assert_eq!(world.fleets[&7].mission, Mission::Stationed);
    }

    #[test]
    fn test_recycle_respects_capacity_and_keeps_field() {
        let mut world = World::new();
        let recycler = world.registry.id_of("recycler").unwrap();
        let mut home = Planet::unowned(1, Coord::new(0, 0, 0));
        home.owner = Some(42);
        world.planets.insert(1, home);

        let field = Coord::new(5, 5, 5);
        world.debris.insert(field, Resources::new(100_000, 80_000, 0));

        let capacity = world.registry.get(recycler).unwrap().cargo_capacity;
        let mut fleet = Fleet::stationed(4, 42, 1, Roster::from_pairs(&[(recycler, 1)]));
        fleet.mission = Mission::Recycling { field };
        fleet.arrival_at = 30;
        world.fleets.insert(4, fleet);

        let outcome = world.resolve(4, 30);
        let ArrivalOutcome::Recycled { collected, .. } = outcome else {
            panic!("expected recycling, got {outcome:?}");
        };
        assert_eq!(collected.total(), capacity);
        // Metal drains before crystal
        assert_eq!(collected.metal, capacity.min(100_000));
        assert_eq!(world.fleets[&4].cargo, collected);
        assert_eq!(world.fleets[&4].mission, Mission::Returning);
        let remaining = world.debris[&field];
        assert_eq!(remaining.total(), 180_000 - capacity);
    }

    #[test]
    fn test_attack_wipes_defender_and_opens_window() {
        let mut world = World::new();
        let lf = world.registry.id_of("light_fighter").unwrap();

        let mut home = Planet::unowned(1, Coord::new(0, 0, 0));
        home.owner = Some(42);
        world.planets.insert(1, home);
        let mut target = Planet::unowned(2, Coord::new(50, 0, 0));
        target.owner = Some(99);
        world.planets.insert(2, target);

        world
            .fleets
            .insert(6, Fleet::stationed(6, 99, 2, Roster::from_pairs(&[(lf, 50)])));
        let mut attacker = Fleet::stationed(8, 42, 1, Roster::from_pairs(&[(lf, 100)]));
        attacker.mission = Mission::Traveling { dest: 2 };
        attacker.departed_at = 0;
        attacker.arrival_at = 200;
        world.fleets.insert(8, attacker);

        let outcome = world.resolve(8, 200);
        let ArrivalOutcome::Battle { outcome: battle, .. } = outcome else {
            panic!("expected a battle, got {outcome:?}");
        };

        assert!(battle.defender_wiped());
        // The defending fleet was destroyed outright
        assert!(!world.fleets.contains_key(&6));
        // Survivors turn for home on a symmetric leg
        let survivor = &world.fleets[&8];
        assert_eq!(survivor.mission, Mission::Returning);
        assert_eq!(survivor.arrival_at, 400);
        // Wiped defender opens the colonization window
        let window = world.planets[&2].colonization_open_until;
        assert_eq!(
            window,
            Some(200 + world.config.colonization_window_secs)
        );
        // Debris landed at the battle site
        let debris = world.debris[&Coord::new(50, 0, 0)];
        assert!(!debris.is_empty());
        assert_eq!(debris.deuterium, 0);
    }
}
