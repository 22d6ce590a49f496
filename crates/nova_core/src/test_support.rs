//! Fixture data for this crate's own unit tests.
//!
//! The unit-test target is a second build of this crate, so it cannot
//! consume `nova_test_utils` without dragging in two incompatible
//! copies of every type here. External targets (benches, other crates'
//! tests) use `nova_test_utils::fixtures`, which carries this same
//! ship roster.
//!
//! The stats are balanced so the standard scenarios resolve the same
//! way every time: light fighters trade efficiently in numbers,
//! cruisers shred fighters with rapid fire, battleship mirror matches
//! stall out past the round limit.

use crate::config::ShipRegistry;
use crate::data::{RapidFireEntry, ShipData};
use crate::resources::Resources;

pub(crate) fn test_ships() -> Vec<ShipData> {
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

pub(crate) fn test_registry() -> ShipRegistry {
    ShipRegistry::from_data(&test_ships()).expect("fixture ship data must compile")
}
