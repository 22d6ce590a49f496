//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Tick resolution must be 100% deterministic so that replays,
//! snapshots and the colonization-race ordering guarantee hold.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different
//!   results. We use fixed-point arithmetic via
//!   [`nova_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   All simulation storage is `BTreeMap`, iterated in key order.
//!
//! - **Wall-clock reads**: The core never reads time; the driver
//!   injects every timestamp.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual model determinism (combat, production)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full tick scenarios are reproducible
//! 4. **Parallel tests**: Running N simulations in parallel all match

use std::thread;

use nova_core::planet::SimTime;
use nova_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one step
/// * `hash` - Function to compute a state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run the same simulation setup against the same timestamp sequence
/// several times and check the final state hashes agree.
pub fn verify_simulation_determinism<Setup>(
    runs: usize,
    timestamps: &[SimTime],
    setup: Setup,
) -> DeterminismResult
where
    Setup: Fn() -> Simulation,
{
    verify_determinism(
        runs,
        timestamps.len() as u64,
        || (setup(), 0usize),
        |(sim, next)| {
            sim.run_tick(timestamps[*next]);
            *next += 1;
        },
        |(sim, _)| sim.state_hash(),
    )
}

/// Run N copies of a simulation on separate threads and compare the
/// final hashes. Catches accidental dependence on thread timing or
/// shared process state.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn verify_parallel_determinism<Setup>(
    num_sims: usize,
    timestamps: Vec<SimTime>,
    setup: Setup,
) -> DeterminismResult
where
    Setup: Fn() -> Simulation + Send + Sync,
{
    let ticks = timestamps.len() as u64;
    let hashes: Vec<u64> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(num_sims);
        for _ in 0..num_sims {
            let setup = &setup;
            let timestamps = &timestamps;
            handles.push(scope.spawn(move || {
                let mut sim = setup();
                for &now in timestamps {
                    sim.run_tick(now);
                }
                sim.state_hash()
            }));
        }
        handles
            .into_iter()
            .map(|handle| handle.join().expect("simulation thread panicked"))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use nova_core::combat::resolve_battle;
    use nova_core::config::GameConfig;
    use nova_core::fleet::Roster;
    use nova_core::planet::Coord;
    use nova_core::simulation::FleetOrder;
    use nova_core::spatial::colonization_difficulty;
    use proptest::prelude::*;

    fn battle_world() -> Simulation {
        let (mut sim, [_, home_b], [wing_a, _]) = fixtures::two_player_world();
        sim.send_fleet(wing_a, FleetOrder::Travel { dest: home_b }, 0)
            .expect("fixture launch must validate");
        sim
    }

    #[test]
    fn test_parallel_empty_simulations() {
        let result =
            verify_parallel_determinism(4, vec![0, 5, 10, 15, 20], fixtures::test_simulation);
        result.assert_deterministic();
    }

    #[test]
    fn test_parallel_battle_simulations() {
        // Timestamps straddle the attack's arrival
        let result = verify_parallel_determinism(4, vec![0, 60, 600, 6_000, 86_400], battle_world);
        result.assert_deterministic();
    }

    #[test]
    fn test_repeated_battle_runs_match() {
        let result = verify_simulation_determinism(5, &[0, 60, 600, 6_000, 86_400], battle_world);
        result.assert_deterministic();
    }

    proptest! {
        /// Any roster matchup resolves identically on every run, and
        /// losses never exceed the ships that were present.
        #[test]
        fn prop_random_battles_are_deterministic(
            attackers in 1u32..400,
            defenders in 1u32..400,
        ) {
            let registry = fixtures::test_registry();
            let config = GameConfig::default();
            let lf = registry.id_of("light_fighter").unwrap();
            let attacker = Roster::from_pairs(&[(lf, attackers)]);
            let defender = Roster::from_pairs(&[(lf, defenders)]);

            let first = resolve_battle(&attacker, &defender, None, &registry, &config).unwrap();
            let second = resolve_battle(&attacker, &defender, None, &registry, &config).unwrap();
            prop_assert_eq!(&first, &second);

            let lost_a = first.attacker_losses.get(&lf).copied().unwrap_or(0);
            let lost_d = first.defender_losses.get(&lf).copied().unwrap_or(0);
            prop_assert!(lost_a <= attackers);
            prop_assert!(lost_d <= defenders);
        }

        /// Colonization difficulty stays in its band for any coordinate.
        #[test]
        fn prop_difficulty_bounded(
            x in -100_000i32..100_000,
            y in -100_000i32..100_000,
            z in -100_000i32..100_000,
        ) {
            let difficulty = colonization_difficulty(Coord::new(x, y, z));
            prop_assert!((1..=5).contains(&difficulty));
        }

        /// Random launch timestamps never break tick reproducibility.
        #[test]
        fn prop_random_tick_times_are_deterministic(
            offsets in proptest::collection::vec(0u64..100_000, 1..8),
        ) {
            let mut timestamps: Vec<u64> = offsets;
            timestamps.sort_unstable();
            let result = verify_simulation_determinism(2, &timestamps, battle_world);
            prop_assert!(result.is_deterministic);
        }
    }
}
