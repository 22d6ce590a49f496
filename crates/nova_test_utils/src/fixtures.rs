//! Test fixtures and helpers.
//!
//! A small but complete ship roster and pre-built game states for
//! consistent testing across crates. The stats are balanced so the
//! standard scenarios resolve the same way every time: light fighters
//! trade efficiently in numbers, cruisers shred fighters with rapid
//! fire, battleship mirror matches stall out past the round limit.

use nova_core::config::ShipRegistry;
use nova_core::data::{RapidFireEntry, ShipData};
use nova_core::fleet::Roster;
use nova_core::planet::{Coord, OwnerId, PlanetId};
use nova_core::resources::Resources;
use nova_core::simulation::Simulation;

/// The raw ship definitions behind [`test_registry`].
#[must_use]
pub fn test_ships() -> Vec<ShipData> {
    vec![
        ShipData {
            id: "light_fighter".to_owned(),
            name: "Light Fighter".to_owned(),
            base_speed: 12_500,
            fuel_rate: 20,
            weapon_power: 50,
            shield: 10,
            hull: 400,
            cargo_capacity: 50,
            cost: Resources::new(3_000, 1_000, 0),
            colony_ship: false,
            recycler: false,
            rapid_fire: Vec::new(),
        },
        ShipData {
            id: "cruiser".to_owned(),
            name: "Cruiser".to_owned(),
            base_speed: 15_000,
            fuel_rate: 300,
            weapon_power: 400,
            shield: 50,
            hull: 2_700,
            cargo_capacity: 800,
            cost: Resources::new(20_000, 7_000, 2_000),
            colony_ship: false,
            recycler: false,
            rapid_fire: vec![RapidFireEntry {
                target: "light_fighter".to_owned(),
                shots: 6,
            }],
        },
        ShipData {
            id: "battleship".to_owned(),
            name: "Battleship".to_owned(),
            base_speed: 10_000,
            fuel_rate: 500,
            weapon_power: 1_000,
            shield: 200,
            hull: 6_000,
            cargo_capacity: 1_500,
            cost: Resources::new(45_000, 15_000, 0),
            colony_ship: false,
            recycler: false,
            rapid_fire: Vec::new(),
        },
        ShipData {
            id: "colony_ship".to_owned(),
            name: "Colony Ship".to_owned(),
            base_speed: 2_500,
            fuel_rate: 1_000,
            weapon_power: 50,
            shield: 100,
            hull: 3_000,
            cargo_capacity: 7_500,
            cost: Resources::new(10_000, 20_000, 10_000),
            colony_ship: true,
            recycler: false,
            rapid_fire: Vec::new(),
        },
        ShipData {
            id: "recycler".to_owned(),
            name: "Recycler".to_owned(),
            base_speed: 2_000,
            fuel_rate: 300,
            weapon_power: 1,
            shield: 10,
            hull: 1_600,
            cargo_capacity: 20_000,
            cost: Resources::new(10_000, 6_000, 2_000),
            colony_ship: false,
            recycler: true,
            rapid_fire: Vec::new(),
        },
        ShipData {
            id: "espionage_probe".to_owned(),
            name: "Espionage Probe".to_owned(),
            base_speed: 100_000_000,
            fuel_rate: 1,
            weapon_power: 10,
            shield: 0,
            hull: 10,
            cargo_capacity: 5,
            cost: Resources::new(0, 1_000, 0),
            colony_ship: false,
            recycler: false,
            rapid_fire: Vec::new(),
        },
        // Stationary defense. Base speed 1 keeps the registry happy;
        // defenses never launch.
        ShipData {
            id: "plasma_turret".to_owned(),
            name: "Plasma Turret".to_owned(),
            base_speed: 1,
            fuel_rate: 0,
            weapon_power: 3_000,
            shield: 300,
            hull: 10_000,
            cargo_capacity: 0,
            cost: Resources::new(50_000, 50_000, 30_000),
            colony_ship: false,
            recycler: false,
            rapid_fire: Vec::new(),
        },
    ]
}

/// Compiled registry over [`test_ships`].
///
/// # Panics
///
/// Panics if the fixture data fails validation, which is a bug in the
/// fixtures themselves.
#[must_use]
pub fn test_registry() -> ShipRegistry {
    ShipRegistry::from_data(&test_ships()).expect("fixture ship data must compile")
}

/// A simulation with the test registry and default rules.
///
/// # Panics
///
/// Panics if the default configuration fails validation.
#[must_use]
pub fn test_simulation() -> Simulation {
    Simulation::new(nova_core::config::GameConfig::default(), test_registry())
        .expect("default config must validate")
}

/// Seed a well-stocked homeworld: mines, power and a full fuel tank.
pub fn seed_homeworld(sim: &mut Simulation, coord: Coord, owner: OwnerId) -> PlanetId {
    let id = sim.create_planet(coord, Some(owner));
    if let Some(planet) = sim.planet_mut(id) {
        planet.stock = Resources::new(1_000_000, 1_000_000, 1_000_000);
        planet.colonization_tech = 5;
        planet.buildings.metal_mine = 10;
        planet.buildings.crystal_mine = 8;
        planet.buildings.deuterium_synthesizer = 5;
        planet.buildings.solar_plant = 12;
    }
    id
}

/// A two-player world: each owner gets a homeworld and a stationed
/// fighter wing. Returns (sim, planet ids, fleet ids).
///
/// # Panics
///
/// Panics if fixture construction fails, which is a bug in the
/// fixtures themselves.
#[must_use]
pub fn two_player_world() -> (Simulation, [PlanetId; 2], [nova_core::fleet::FleetId; 2]) {
    let mut sim = test_simulation();
    let home_a = seed_homeworld(&mut sim, Coord::new(0, 0, 0), 1);
    let home_b = seed_homeworld(&mut sim, Coord::new(100, 0, 0), 2);
    let lf = sim
        .registry()
        .id_of("light_fighter")
        .expect("fixture registry has light fighters");
    let wing_a = sim
        .create_fleet(home_a, 1, Roster::from_pairs(&[(lf, 100)]))
        .expect("homeworld exists");
    let wing_b = sim
        .create_fleet(home_b, 2, Roster::from_pairs(&[(lf, 50)]))
        .expect("homeworld exists");
    (sim, [home_a, home_b], [wing_a, wing_b])
}
