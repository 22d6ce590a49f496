//! The tick scheduler and top-level simulation state.
//!
//! [`Simulation`] owns every planet, fleet, debris field, combat
//! report and the append-only tick log. All time advances through
//! [`Simulation::run_tick`]: the driver injects the current timestamp
//! and the simulation applies production and arrival resolution as one
//! logical unit of work. The exclusive `&mut self` borrow is the
//! consistency boundary; no caller can observe a half-applied tick.
//!
//! Determinism contract: given the same starting state, configuration
//! and sequence of `run_tick` timestamps, two simulations produce
//! byte-identical state. Planets are processed in ascending id order
//! and due fleets in ascending (arrival time, fleet id) order, which
//! is the fixed serialization point that makes same-tick colonization
//! races reproducible.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::arrival::{resolve_arrival, ArrivalOutcome, ResolverCtx};
use crate::combat::CombatReport;
use crate::config::{GameConfig, ShipRegistry};
use crate::error::{LaunchError, RecallError, Result, SimError};
use crate::fleet::{Fleet, FleetId, Mission, Roster};
use crate::planet::{Coord, OwnerId, Planet, PlanetId, SimTime};
use crate::production::run_production;
use crate::resources::Resources;
use crate::spatial::{colonization_difficulty, distance, fleet_speed, fuel_consumed, travel_time_hours};

/// Source of the current simulation timestamp.
///
/// The core never reads wall time. The server drives ticks off a
/// system clock; tests drive them off a fake one.
pub trait Clock {
    /// Current time in whole seconds.
    fn now(&self) -> SimTime;
}

/// Where a launched fleet is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetOrder {
    /// Fly to a planet: attack if hostile, reinforce if friendly.
    Travel {
        /// Destination planet.
        dest: PlanetId,
    },
    /// Fly to raw coordinates and found a colony there.
    Colonize {
        /// Target coordinates.
        dest: Coord,
    },
    /// Fly to a debris field and harvest it.
    Recycle {
        /// Coordinates of the field.
        field: Coord,
    },
}

/// One line of the append-only tick log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickLog {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Injected timestamp the tick ran at.
    pub at: SimTime,
    /// Seconds of production applied.
    pub production_secs: u64,
    /// Fleets whose arrivals were resolved.
    pub arrivals: u32,
    /// Battles fought.
    pub battles: u32,
    /// Colonies founded.
    pub colonies: u32,
    /// Per-entity resolution failures logged and skipped.
    pub errors: u32,
}

/// What one call to [`Simulation::run_tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick log entry that was appended.
    pub log: TickLog,
}

/// Complete simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: GameConfig,
    registry: ShipRegistry,
    planets: BTreeMap<PlanetId, Planet>,
    fleets: BTreeMap<FleetId, Fleet>,
    debris: BTreeMap<Coord, Resources>,
    reports: Vec<CombatReport>,
    tick_log: Vec<TickLog>,
    tick: u64,
    last_tick_at: Option<SimTime>,
    next_planet_id: PlanetId,
    next_fleet_id: FleetId,
    next_report_id: u64,
}

impl Simulation {
    /// Create an empty simulation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the configuration fails
    /// startup validation.
    pub fn new(config: GameConfig, registry: ShipRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            planets: BTreeMap::new(),
            fleets: BTreeMap::new(),
            debris: BTreeMap::new(),
            reports: Vec::new(),
            tick_log: Vec::new(),
            tick: 0,
            last_tick_at: None,
            next_planet_id: 1,
            next_fleet_id: 1,
            next_report_id: 1,
        })
    }

    /// Seed a planet and return its id.
    pub fn create_planet(&mut self, coord: Coord, owner: Option<OwnerId>) -> PlanetId {
        let id = self.next_planet_id;
        self.next_planet_id += 1;
        let mut planet = Planet::unowned(id, coord);
        planet.owner = owner;
        self.planets.insert(id, planet);
        id
    }

    /// Create a stationed fleet at a planet and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PlanetNotFound`] if the origin planet does
    /// not exist.
    pub fn create_fleet(
        &mut self,
        origin: PlanetId,
        owner: OwnerId,
        roster: Roster,
    ) -> Result<FleetId> {
        if !self.planets.contains_key(&origin) {
            return Err(SimError::PlanetNotFound(origin));
        }
        let id = self.next_fleet_id;
        self.next_fleet_id += 1;
        self.fleets.insert(id, Fleet::stationed(id, owner, origin, roster));
        Ok(id)
    }

    /// Launch a stationed fleet on a mission.
    ///
    /// All validation happens before any state mutation; on error the
    /// fleet and both planets are untouched. On success the fuel is
    /// deducted from the origin planet's deuterium, the travel window
    /// is written onto the fleet and the arrival timestamp returned.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`] describing the first failed check.
    pub fn send_fleet(
        &mut self,
        fleet_id: FleetId,
        order: FleetOrder,
        now: SimTime,
    ) -> std::result::Result<SimTime, LaunchError> {
        let fleet = self
            .fleets
            .get(&fleet_id)
            .ok_or(LaunchError::UnknownFleet(fleet_id))?;
        if fleet.mission.is_underway() {
            return Err(LaunchError::AlreadyUnderway(fleet_id));
        }
        if fleet.roster.is_empty() {
            return Err(LaunchError::EmptyRoster);
        }
        // A garrisoned fleet launches from the planet it sits at, not
        // from its home planet.
        let start_id = match fleet.mission {
            Mission::Defending { planet } => planet,
            _ => fleet.origin,
        };
        let origin = self
            .planets
            .get(&start_id)
            .ok_or(LaunchError::UnknownOrigin(start_id))?;

        let target = match order {
            FleetOrder::Travel { dest } => {
                self.planets
                    .get(&dest)
                    .ok_or(LaunchError::UnknownDestination(dest))?
                    .coord
            }
            FleetOrder::Colonize { dest } => {
                if !fleet.roster.has_colony_ship(&self.registry) {
                    return Err(LaunchError::NoColonyShip);
                }
                let required = colonization_difficulty(dest);
                if origin.colonization_tech < required {
                    return Err(LaunchError::ColonizationTechTooLow {
                        required,
                        actual: origin.colonization_tech,
                    });
                }
                let owned = self
                    .planets
                    .values()
                    .filter(|p| p.owner == Some(fleet.owner))
                    .count();
                if owned as u32 >= self.config.colony_limit {
                    return Err(LaunchError::ColonyLimitReached {
                        limit: self.config.colony_limit,
                    });
                }
                if self
                    .planets
                    .values()
                    .any(|p| p.coord == dest && !p.claimable_at(now))
                {
                    return Err(LaunchError::DestinationOccupied);
                }
                dest
            }
            FleetOrder::Recycle { field } => {
                if fleet.roster.recycler_capacity(&self.registry) == 0 {
                    return Err(LaunchError::NoRecyclers);
                }
                field
            }
        };

        let trip = distance(origin.coord, target);
        let travel_secs = self.travel_secs(&fleet.roster, trip)?;
        let fuel = fuel_consumed(&fleet.roster, trip, &self.registry)
            .map_err(|_| LaunchError::UnknownShipType)?;
        if origin.stock.deuterium < fuel {
            return Err(LaunchError::InsufficientFuel {
                required: fuel,
                available: origin.stock.deuterium,
            });
        }

        // All checks passed: mutate.
        if let Some(planet) = self.planets.get_mut(&start_id) {
            planet.stock.deuterium -= fuel;
        }
        let arrival = now.saturating_add(travel_secs);
        if let Some(fleet) = self.fleets.get_mut(&fleet_id) {
            fleet.mission = match order {
                FleetOrder::Travel { dest } => Mission::Traveling { dest },
                FleetOrder::Colonize { dest } => Mission::Colonizing { dest },
                FleetOrder::Recycle { field } => Mission::Recycling { field },
            };
            fleet.departed_at = now;
            fleet.arrival_at = arrival;
        }
        tracing::info!(
            fleet = fleet_id,
            ?order,
            arrival,
            fuel,
            "Fleet launched"
        );
        Ok(arrival)
    }

    /// Recall an outbound fleet.
    ///
    /// The return leg takes as long as the fleet has already flown, so
    /// a recall at the halfway point lands home at the original ETA.
    ///
    /// # Errors
    ///
    /// Returns a [`RecallError`] if the fleet is unknown or not on an
    /// outbound mission.
    pub fn recall_fleet(
        &mut self,
        fleet_id: FleetId,
        now: SimTime,
    ) -> std::result::Result<SimTime, RecallError> {
        let fleet = self
            .fleets
            .get_mut(&fleet_id)
            .ok_or(RecallError::UnknownFleet(fleet_id))?;
        if !fleet.mission.is_outbound() {
            return Err(RecallError::NotOutbound(fleet_id));
        }
        let elapsed = now.saturating_sub(fleet.departed_at).min(fleet.leg_secs());
        fleet.turn_back(now, elapsed);
        tracing::info!(fleet = fleet_id, arrival = fleet.arrival_at, "Fleet recalled");
        Ok(fleet.arrival_at)
    }

    /// Advance the simulation to `now`.
    ///
    /// One logical unit of work: production for every planet in
    /// ascending id order, then arrival resolution for every due fleet
    /// in ascending (arrival time, fleet id) order, then one tick log
    /// entry. Per-entity resolution failures are logged and skipped;
    /// the tick itself never aborts. Manual/admin ticks must call this
    /// same method.
    pub fn run_tick(&mut self, now: SimTime) -> TickSummary {
        self.tick += 1;
        let elapsed = self
            .last_tick_at
            .map_or(0, |last| now.saturating_sub(last));
        self.last_tick_at = Some(now);

        for planet in self.planets.values_mut() {
            run_production(planet, &self.config, elapsed);
        }

        // Snapshot the due set before resolving anything, so fleets
        // that flip to Returning mid-tick are not re-resolved.
        let mut due: Vec<(SimTime, FleetId)> = self
            .fleets
            .values()
            .filter(|fleet| fleet.is_due(now))
            .map(|fleet| (fleet.arrival_at, fleet.id))
            .collect();
        due.sort_unstable();

        let mut arrivals = 0u32;
        let mut battles = 0u32;
        let mut colonies = 0u32;
        let mut errors = 0u32;
        for (_, fleet_id) in due {
            let mut ctx = ResolverCtx {
                planets: &mut self.planets,
                fleets: &mut self.fleets,
                debris: &mut self.debris,
                next_planet_id: &mut self.next_planet_id,
                registry: &self.registry,
                config: &self.config,
                now,
            };
            match resolve_arrival(&mut ctx, fleet_id) {
                Ok(ArrivalOutcome::Battle {
                    planet,
                    location,
                    attacker,
                    defender,
                    outcome,
                }) => {
                    arrivals += 1;
                    battles += 1;
                    let report = CombatReport {
                        id: self.next_report_id,
                        tick: self.tick,
                        at: now,
                        location,
                        attacker,
                        defender,
                        outcome,
                    };
                    self.next_report_id += 1;
                    tracing::info!(
                        report = report.id,
                        planet,
                        attacker,
                        ?defender,
                        rounds = report.outcome.rounds.len(),
                        "Battle resolved"
                    );
                    self.reports.push(report);
                }
                Ok(ArrivalOutcome::ColonyFounded { planet }) => {
                    arrivals += 1;
                    colonies += 1;
                    tracing::info!(fleet = fleet_id, planet, "Colony founded");
                }
                Ok(ArrivalOutcome::AlreadyResolved | ArrivalOutcome::NotDue) => {}
                Ok(_) => arrivals += 1,
                Err(err) => {
                    errors += 1;
                    tracing::warn!(fleet = fleet_id, %err, "Arrival resolution skipped");
                }
            }
        }

        let log = TickLog {
            tick: self.tick,
            at: now,
            production_secs: elapsed,
            arrivals,
            battles,
            colonies,
            errors,
        };
        self.tick_log.push(log);

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        TickSummary { log }
    }

    /// Current tick number.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Look up a planet.
    #[must_use]
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(&id)
    }

    /// Look up a fleet.
    #[must_use]
    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.get(&id)
    }

    /// Iterate planets in ascending id order.
    pub fn planets(&self) -> impl Iterator<Item = &Planet> {
        self.planets.values()
    }

    /// Iterate fleets in ascending id order.
    pub fn fleets(&self) -> impl Iterator<Item = &Fleet> {
        self.fleets.values()
    }

    /// Interpolated position of an outbound fleet at `now`.
    ///
    /// Display-only: resolution never reads this. Returns `None` for
    /// parked or returning fleets (the return leg's remote endpoint is
    /// not recorded).
    #[must_use]
    pub fn fleet_position(&self, id: FleetId, now: SimTime) -> Option<crate::math::Vec3Fixed> {
        let fleet = self.fleets.get(&id)?;
        let origin = self.planets.get(&fleet.origin)?.coord;
        let target = match fleet.mission {
            Mission::Traveling { dest } => self.planets.get(&dest)?.coord,
            Mission::Colonizing { dest } | Mission::Recycling { field: dest } => dest,
            _ => return None,
        };
        Some(crate::spatial::interpolated_position(
            origin,
            target,
            fleet.progress_at(now),
        ))
    }

    /// Debris field at a coordinate, if one was ever created there.
    #[must_use]
    pub fn debris_at(&self, coord: Coord) -> Option<Resources> {
        self.debris.get(&coord).copied()
    }

    /// All combat reports, oldest first.
    #[must_use]
    pub fn reports(&self) -> &[CombatReport] {
        &self.reports
    }

    /// The append-only tick log.
    #[must_use]
    pub fn tick_log(&self) -> &[TickLog] {
        &self.tick_log
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The compiled ship registry.
    #[must_use]
    pub fn registry(&self) -> &ShipRegistry {
        &self.registry
    }

    /// Direct mutable planet access for seeding and admin tooling.
    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(&id)
    }

    fn travel_secs(
        &self,
        roster: &Roster,
        trip: crate::math::Fixed,
    ) -> std::result::Result<SimTime, LaunchError> {
        let speed = fleet_speed(roster, &self.registry).ok_or(LaunchError::UnknownShipType)?;
        let hours = travel_time_hours(trip, speed).ok_or(LaunchError::UnknownShipType)?;
        let secs = hours * crate::math::Fixed::from_num(3600) / self.config.speed_multiplier;
        // Even a zero-length hop takes one tick to come due.
        Ok(secs.ceil().to_num::<SimTime>().max(1))
    }

    /// Hash of the full simulation state.
    ///
    /// Two simulations that ran the same ticks from the same seed
    /// produce identical hashes; a divergence means a determinism bug.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.planets.len().hash(&mut hasher);
        for (id, planet) in &self.planets {
            id.hash(&mut hasher);
            planet.coord.hash(&mut hasher);
            planet.owner.hash(&mut hasher);
            planet.stock.hash(&mut hasher);
            planet.colonization_open_until.hash(&mut hasher);
            planet.carry.metal.to_bits().hash(&mut hasher);
            planet.carry.crystal.to_bits().hash(&mut hasher);
            planet.carry.deuterium.to_bits().hash(&mut hasher);
        }
        self.fleets.len().hash(&mut hasher);
        for (id, fleet) in &self.fleets {
            id.hash(&mut hasher);
            fleet.owner.hash(&mut hasher);
            fleet.origin.hash(&mut hasher);
            fleet.cargo.hash(&mut hasher);
            fleet.departed_at.hash(&mut hasher);
            fleet.arrival_at.hash(&mut hasher);
            for (ship_type, count) in fleet.roster.present() {
                ship_type.hash(&mut hasher);
                count.hash(&mut hasher);
            }
        }
        for (coord, field) in &self.debris {
            coord.hash(&mut hasher);
            field.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Serialize the full state for snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidState`] if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| SimError::InvalidState(format!("failed to serialize simulation: {e}")))
    }

    /// Restore state from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidState`] if the bytes do not decode.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| SimError::InvalidState(format!("failed to deserialize simulation: {e}")))
    }
}
