//! Multi-round battle resolution.
//!
//! `resolve_battle` is a pure function: two opposing rosters (plus
//! optional planetary defenses merged into the defender side) go in,
//! a round log, per-side losses and a debris yield come out. Identical
//! inputs always yield identical outputs - there is no randomness.
//! Damage across ship instances is distributed proportionally to each
//! type's share of incoming fire, with whole-ship kills floored; the
//! sub-kill remainder does not carry across rounds.
//!
//! All arithmetic is plain integer math over `u128` intermediates so
//! arbitrarily large rosters cannot overflow.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, ShipRegistry, ShipTypeId};
use crate::error::ConfigError;
use crate::fleet::Roster;
use crate::planet::{Coord, OwnerId, SimTime};
use crate::resources::Resources;

/// Which side of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleSide {
    /// The arriving fleet.
    Attacker,
    /// The stationed fleets plus planetary defenses.
    Defender,
}

/// Firepower and damage figures for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number, starting at 1.
    pub round: u32,
    /// Total firepower the attacker put out.
    pub attacker_firepower: u64,
    /// Total firepower the defender put out.
    pub defender_firepower: u64,
    /// Damage the attacker's shields absorbed.
    pub attacker_shield_absorbed: u64,
    /// Damage the defender's shields absorbed.
    pub defender_shield_absorbed: u64,
    /// Hull damage that reached the attacker.
    pub attacker_hull_damage: u64,
    /// Hull damage that reached the defender.
    pub defender_hull_damage: u64,
    /// Ships the attacker lost this round.
    pub attacker_ships_lost: u64,
    /// Ships the defender lost this round.
    pub defender_ships_lost: u64,
}

/// The result of a resolved battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// The side still holding ships when the battle ended.
    pub winner: BattleSide,
    /// Per-round firepower/damage log.
    pub rounds: Vec<RoundRecord>,
    /// Attacker losses per ship type.
    pub attacker_losses: BTreeMap<ShipTypeId, u32>,
    /// Defender losses per ship type (merged side, defenses included).
    pub defender_losses: BTreeMap<ShipTypeId, u32>,
    /// Debris left floating at the battle site. Metal and crystal only.
    pub debris: Resources,
}

impl BattleOutcome {
    /// Whether the merged defender side was wiped out entirely.
    #[must_use]
    pub fn defender_wiped(&self) -> bool {
        matches!(self.winner, BattleSide::Attacker)
    }
}

/// Immutable record of one resolved battle, written once per attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    /// Sequential report id.
    pub id: u64,
    /// Tick in which the battle resolved.
    pub tick: u64,
    /// Timestamp of resolution.
    pub at: SimTime,
    /// Where the battle took place.
    pub location: Coord,
    /// Owner of the attacking fleet.
    pub attacker: OwnerId,
    /// Owner of the defending planet, if it had one.
    pub defender: Option<OwnerId>,
    /// Full battle outcome.
    pub outcome: BattleOutcome,
}

/// One side's mutable state during resolution.
struct SideState {
    /// Current ship counts per type, ascending type id.
    counts: BTreeMap<ShipTypeId, u64>,
    /// Starting counts, for loss accounting.
    initial: BTreeMap<ShipTypeId, u64>,
}

impl SideState {
    fn from_rosters(rosters: &[&Roster]) -> Self {
        let mut counts: BTreeMap<ShipTypeId, u64> = BTreeMap::new();
        for roster in rosters {
            for (ship_type, count) in roster.present() {
                *counts.entry(ship_type).or_insert(0) += u64::from(count);
            }
        }
        Self {
            initial: counts.clone(),
            counts,
        }
    }

    fn total_ships(&self) -> u64 {
        self.counts.values().sum()
    }

    fn is_empty(&self) -> bool {
        self.total_ships() == 0
    }

    fn shield_pool(&self, registry: &ShipRegistry) -> Result<u64, ConfigError> {
        let mut pool: u64 = 0;
        for (&ship_type, &count) in &self.counts {
            pool = pool.saturating_add(registry.stats(ship_type)?.shield.saturating_mul(count));
        }
        Ok(pool)
    }

    fn losses(&self) -> BTreeMap<ShipTypeId, u32> {
        self.initial
            .iter()
            .filter_map(|(&ship_type, &start)| {
                let end = self.counts.get(&ship_type).copied().unwrap_or(0);
                let lost = start - end;
                (lost > 0).then(|| (ship_type, lost.min(u64::from(u32::MAX)) as u32))
            })
            .collect()
    }
}

/// Damage directed at each target type for one round of fire.
///
/// Base shots spread across target types proportionally to their count
/// share; a rapid-fire entry scales the portion landing on its target
/// type. One pass only - extra shots never trigger further rapid fire.
fn directed_damage(
    firing: &SideState,
    target: &SideState,
    registry: &ShipRegistry,
) -> Result<BTreeMap<ShipTypeId, u128>, ConfigError> {
    let target_total = u128::from(target.total_ships());
    let mut directed: BTreeMap<ShipTypeId, u128> = BTreeMap::new();
    if target_total == 0 {
        return Ok(directed);
    }

    for (&firing_type, &firing_count) in &firing.counts {
        if firing_count == 0 {
            continue;
        }
        let weapon = u128::from(registry.stats(firing_type)?.weapon_power);
        for (&target_type, &target_count) in &target.counts {
            if target_count == 0 {
                continue;
            }
            let shots = u128::from(registry.shots_against(firing_type, target_type));
            let damage =
                u128::from(firing_count) * weapon * shots * u128::from(target_count) / target_total;
            *directed.entry(target_type).or_insert(0) += damage;
        }
    }
    Ok(directed)
}

/// Apply one round of directed damage to a side.
///
/// Shields absorb first (the pool regenerates every round), the rest
/// is hull damage split by each type's share of the incoming fire.
/// Returns (shield absorbed, hull damage, ships destroyed).
fn apply_damage(
    side: &mut SideState,
    directed: &BTreeMap<ShipTypeId, u128>,
    registry: &ShipRegistry,
) -> Result<(u64, u64, u64), ConfigError> {
    let incoming: u128 = directed.values().sum();
    if incoming == 0 {
        return Ok((0, 0, 0));
    }

    let pool = u128::from(side.shield_pool(registry)?);
    let absorbed = pool.min(incoming);
    let hull_total = incoming - absorbed;

    let mut destroyed_total: u64 = 0;
    for (&target_type, &damage) in directed {
        let hull_share = hull_total * damage / incoming;
        if hull_share == 0 {
            continue;
        }
        let hull_per_ship = u128::from(registry.stats(target_type)?.hull.max(1));
        let kills = hull_share / hull_per_ship;
        if let Some(count) = side.counts.get_mut(&target_type) {
            let killed = (*count as u128).min(kills) as u64;
            *count -= killed;
            destroyed_total += killed;
        }
    }
    side.counts.retain(|_, &mut count| count > 0);

    Ok((
        absorbed.min(u128::from(u64::MAX)) as u64,
        hull_total.min(u128::from(u64::MAX)) as u64,
        destroyed_total,
    ))
}

/// Debris yield: a configured percentage of the metal+crystal build
/// cost of everything destroyed on either side.
fn debris_from_losses(
    losses: [&BTreeMap<ShipTypeId, u32>; 2],
    registry: &ShipRegistry,
    config: &GameConfig,
) -> Result<Resources, ConfigError> {
    let mut destroyed_cost = Resources::ZERO;
    for side in losses {
        for (&ship_type, &count) in side {
            let cost = registry.stats(ship_type)?.cost;
            destroyed_cost += Resources::new(
                cost.metal * u64::from(count),
                cost.crystal * u64::from(count),
                0,
            );
        }
    }
    Ok(destroyed_cost
        .without_deuterium()
        .scaled(config.debris_percent, 100))
}

/// Resolve a battle between an attacking roster and a defending side.
///
/// The defender side is the stationed roster merged with planetary
/// defenses, if any. Runs up to `config.max_combat_rounds` rounds and
/// stops early once a side is out of ships. The defender wins draws:
/// simultaneous annihilation and a timeout with both sides alive both
/// count as a failed attack.
pub fn resolve_battle(
    attacker: &Roster,
    defender: &Roster,
    planet_defenses: Option<&Roster>,
    registry: &ShipRegistry,
    config: &GameConfig,
) -> Result<BattleOutcome, ConfigError> {
    let mut att = SideState::from_rosters(&[attacker]);
    let mut def = match planet_defenses {
        Some(defenses) => SideState::from_rosters(&[defender, defenses]),
        None => SideState::from_rosters(&[defender]),
    };

    let mut rounds = Vec::new();
    for round in 1..=config.max_combat_rounds {
        if att.is_empty() || def.is_empty() {
            break;
        }

        // Both sides fire simultaneously off the same snapshot.
        let at_defender = directed_damage(&att, &def, registry)?;
        let at_attacker = directed_damage(&def, &att, registry)?;

        let attacker_firepower: u128 = at_defender.values().sum();
        let defender_firepower: u128 = at_attacker.values().sum();

        let (def_absorbed, def_hull, def_lost) = apply_damage(&mut def, &at_defender, registry)?;
        let (att_absorbed, att_hull, att_lost) = apply_damage(&mut att, &at_attacker, registry)?;

        rounds.push(RoundRecord {
            round,
            attacker_firepower: attacker_firepower.min(u128::from(u64::MAX)) as u64,
            defender_firepower: defender_firepower.min(u128::from(u64::MAX)) as u64,
            attacker_shield_absorbed: att_absorbed,
            defender_shield_absorbed: def_absorbed,
            attacker_hull_damage: att_hull,
            defender_hull_damage: def_hull,
            attacker_ships_lost: att_lost,
            defender_ships_lost: def_lost,
        });
    }

    // Defender wins ties and timeouts.
    let winner = if def.is_empty() && !att.is_empty() {
        BattleSide::Attacker
    } else {
        BattleSide::Defender
    };

    let attacker_losses = att.losses();
    let defender_losses = def.losses();
    let debris = debris_from_losses([&attacker_losses, &defender_losses], registry, config)?;

    Ok(BattleOutcome {
        winner,
        rounds,
        attacker_losses,
        defender_losses,
        debris,
    })
}
