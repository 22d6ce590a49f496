//! Spatial model: distance, speed, fuel, ETA and position interpolation.
//!
//! Pure, stateless functions. All per-ship numbers come from the
//! [`ShipRegistry`](crate::config::ShipRegistry) - nothing is hardcoded
//! here.

use crate::config::ShipRegistry;
use crate::error::ConfigError;
use crate::fleet::Roster;
use crate::math::{fixed_sqrt_int, Fixed, Vec3Fixed};
use crate::planet::Coord;

/// Lowest colonization difficulty.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest colonization difficulty.
pub const MAX_DIFFICULTY: u8 = 5;
/// Mean-absolute-coordinate units per difficulty step.
const DIFFICULTY_STEP: i64 = 200;

/// Euclidean distance between two coordinates.
///
/// The squared distance is accumulated in wide integer math, so the
/// full `i32` coordinate range is safe; only the root enters
/// fixed-point. Saturates at `Fixed::MAX` for pairs farther apart than
/// the fixed-point integer range.
#[must_use]
pub fn distance(a: Coord, b: Coord) -> Fixed {
    let dx = u128::from(a.x.abs_diff(b.x));
    let dy = u128::from(a.y.abs_diff(b.y));
    let dz = u128::from(a.z.abs_diff(b.z));
    fixed_sqrt_int(dx * dx + dy * dy + dz * dz)
}

/// Colonization difficulty of a coordinate, in `[1, 5]`.
///
/// A monotone non-decreasing step function of the mean absolute
/// coordinate: `clamp(floor(mean_abs / 200), 1, 5)`. Integer math only.
#[must_use]
pub fn colonization_difficulty(coord: Coord) -> u8 {
    let steps = coord.mean_abs() / DIFFICULTY_STEP;
    steps.clamp(i64::from(MIN_DIFFICULTY), i64::from(MAX_DIFFICULTY)) as u8
}

/// Fleet speed: the minimum base speed over ship types present.
///
/// Returns `None` for an empty roster - a fleet with zero ships has no
/// defined speed and callers must reject it before this call.
#[must_use]
pub fn fleet_speed(roster: &Roster, registry: &ShipRegistry) -> Option<u32> {
    roster
        .present()
        .filter_map(|(ship_type, _)| registry.get(ship_type).map(|stats| stats.base_speed))
        .min()
}

/// Travel time in hours for a distance at a speed.
///
/// Returns `None` when `speed` is zero; the registry refuses zero base
/// speeds at startup, so this only guards corrupted inputs.
#[must_use]
pub fn travel_time_hours(distance: Fixed, speed: u32) -> Option<Fixed> {
    if speed == 0 {
        return None;
    }
    Some(distance / Fixed::from_num(speed))
}

/// Deuterium consumed by a roster over a distance.
///
/// `Σ count × fuel_rate / base_speed × distance`, rounded up to whole
/// deuterium units. The per-type term is accumulated in wide integer
/// math over the raw fixed-point distance bits, so arbitrarily large
/// ship counts cannot overflow; absurd totals saturate at `u64::MAX`.
pub fn fuel_consumed(
    roster: &Roster,
    distance: Fixed,
    registry: &ShipRegistry,
) -> Result<u64, ConfigError> {
    let dist_bits = u128::from(distance.to_bits().max(0).unsigned_abs());
    let mut total_bits: u128 = 0;
    for (ship_type, count) in roster.present() {
        let stats = registry.stats(ship_type)?;
        let units = u128::from(count) * u128::from(stats.fuel_rate);
        let term = units.saturating_mul(dist_bits) / u128::from(stats.base_speed.max(1));
        total_bits = total_bits.saturating_add(term);
    }
    let fuel = total_bits.div_ceil(1 << 32);
    Ok(u64::try_from(fuel).unwrap_or(u64::MAX))
}

/// Position along the straight line from `origin` to `dest`.
///
/// `progress` is clamped to `[0, 1]`; progress of 1 (or more) yields
/// exactly `dest` with no floating drift at the terminal state.
#[must_use]
pub fn interpolated_position(origin: Coord, dest: Coord, progress: Fixed) -> Vec3Fixed {
    Vec3Fixed::from_coord(origin).lerp(Vec3Fixed::from_coord(dest), progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShipTypeId;
    use crate::test_support as fixtures;

    #[test]
    fn test_distance_345() {
        let d = distance(Coord::new(0, 0, 0), Coord::new(3, 4, 0));
        let epsilon = Fixed::ONE / Fixed::from_num(10000);
        assert!((d - Fixed::from_num(5)).abs() < epsilon);
    }

    #[test]
    fn test_distance_survives_wide_coordinates() {
        // 50_000 per axis is an ordinary hop; the square must not
        // overflow on the way to the root
        let d = distance(Coord::new(0, 0, 0), Coord::new(50_000, 50_000, 50_000));
        // 50_000 * sqrt(3)
        assert!(d > Fixed::from_num(86_602));
        assert!(d < Fixed::from_num(86_603));

        // Opposite corners of the coordinate space saturate
        let extreme = distance(
            Coord::new(i32::MIN, i32::MIN, i32::MIN),
            Coord::new(i32::MAX, i32::MAX, i32::MAX),
        );
        assert_eq!(extreme, Fixed::MAX);
    }

    #[test]
    fn test_difficulty_bounds_and_examples() {
        // mean_abs = (300+400+500)/3 = 400, then 400/200 = 2
        assert_eq!(colonization_difficulty(Coord::new(300, 400, 500)), 2);
        // Near the origin the floor would be 0; clamped up to 1
        assert_eq!(colonization_difficulty(Coord::new(10, 10, 10)), 1);
        // Far out it clamps at 5
        assert_eq!(
            colonization_difficulty(Coord::new(100_000, 100_000, 100_000)),
            5
        );
        // Sign does not matter
        assert_eq!(
            colonization_difficulty(Coord::new(-300, -400, -500)),
            colonization_difficulty(Coord::new(300, 400, 500))
        );
    }

    #[test]
    fn test_difficulty_monotone_in_mean_abs() {
        let mut previous = 0;
        for step in 0..60 {
            let c = step * 50;
            let difficulty = colonization_difficulty(Coord::new(c, c, c));
            assert!(difficulty >= previous, "difficulty must not decrease");
            assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty));
            previous = difficulty;
        }
    }

    #[test]
    fn test_fleet_speed_is_min_of_present() {
        let registry = fixtures::test_registry();
        let lf = registry.id_of("light_fighter").unwrap();
        let recycler = registry.id_of("recycler").unwrap();

        // light_fighter is faster than recycler in the fixture data
        let roster = Roster::from_pairs(&[(lf, 10), (recycler, 1)]);
        let speed = fleet_speed(&roster, &registry).unwrap();
        assert_eq!(speed, registry.get(recycler).unwrap().base_speed);

        // A zero-count entry does not drag the speed down
        let roster = Roster::from_pairs(&[(lf, 10), (recycler, 0)]);
        let speed = fleet_speed(&roster, &registry).unwrap();
        assert_eq!(speed, registry.get(lf).unwrap().base_speed);
    }

    #[test]
    fn test_fleet_speed_empty_roster_is_none() {
        let registry = fixtures::test_registry();
        assert!(fleet_speed(&Roster::new(), &registry).is_none());
        assert!(fleet_speed(&Roster::from_pairs(&[(ShipTypeId::new(0), 0)]), &registry).is_none());
    }

    #[test]
    fn test_travel_time_guards_zero_speed() {
        assert!(travel_time_hours(Fixed::from_num(100), 0).is_none());
        let hours = travel_time_hours(Fixed::from_num(100), 50).unwrap();
        assert_eq!(hours, Fixed::from_num(2));
    }

    #[test]
    fn test_fuel_scales_with_distance_and_count() {
        let registry = fixtures::test_registry();
        let lf = registry.id_of("light_fighter").unwrap();

        let one = Roster::from_pairs(&[(lf, 1)]);
        let ten = Roster::from_pairs(&[(lf, 10)]);
        let d = Fixed::from_num(1000);

        let fuel_one = fuel_consumed(&one, d, &registry).unwrap();
        let fuel_ten = fuel_consumed(&ten, d, &registry).unwrap();
        assert!(fuel_one > 0);
        // Ceil rounding allows at most a unit of slack from exactly 10x
        assert!(fuel_ten >= fuel_one * 10 - 10 && fuel_ten <= fuel_one * 10);

        let farther = fuel_consumed(&one, Fixed::from_num(2000), &registry).unwrap();
        assert!(farther > fuel_one);
    }

    #[test]
    fn test_fuel_huge_roster_does_not_overflow() {
        let registry = fixtures::test_registry();
        let lf = registry.id_of("light_fighter").unwrap();

        let horde = Roster::from_pairs(&[(lf, u32::MAX)]);
        let fuel = fuel_consumed(&horde, Fixed::from_num(1000), &registry).unwrap();
        // u32::MAX ships * rate 20 * 1000 / speed 12500, exactly
        assert_eq!(fuel, 6_871_947_672);
    }

    #[test]
    fn test_interpolation_terminal_is_exact() {
        let origin = Coord::new(0, 0, 0);
        let dest = Coord::new(7, -13, 29);

        let end = interpolated_position(origin, dest, Fixed::ONE);
        assert_eq!(end, Vec3Fixed::from_coord(dest));

        let past = interpolated_position(origin, dest, Fixed::from_num(3));
        assert_eq!(past, Vec3Fixed::from_coord(dest));

        let start = interpolated_position(origin, dest, Fixed::ZERO);
        assert_eq!(start, Vec3Fixed::from_coord(origin));
    }
}
