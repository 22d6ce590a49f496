//! Resource stock arithmetic.
//!
//! All resource quantities are non-negative integers with no hard cap.
//! Arithmetic saturates rather than wrapping so a malformed input can
//! never drive a stock negative.

use serde::{Deserialize, Serialize};

/// A bundle of the three resource types.
///
/// Used for planet stocks, fleet cargo, ship build costs and debris
/// fields alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Resources {
    /// Metal units.
    pub metal: u64,
    /// Crystal units.
    pub crystal: u64,
    /// Deuterium units.
    pub deuterium: u64,
}

impl Resources {
    /// Create a new resource bundle.
    #[must_use]
    pub const fn new(metal: u64, crystal: u64, deuterium: u64) -> Self {
        Self {
            metal,
            crystal,
            deuterium,
        }
    }

    /// Empty bundle.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Total units across all three types.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.metal + self.crystal + self.deuterium
    }

    /// Check whether every component is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.metal == 0 && self.crystal == 0 && self.deuterium == 0
    }

    /// Check whether this stock covers a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: Resources) -> bool {
        self.metal >= cost.metal && self.crystal >= cost.crystal && self.deuterium >= cost.deuterium
    }

    /// Spend a cost from this stock.
    ///
    /// Returns `true` if the transaction succeeded; the stock is left
    /// unchanged when it cannot cover the cost.
    pub fn spend(&mut self, cost: Resources) -> bool {
        if self.can_afford(cost) {
            self.metal -= cost.metal;
            self.crystal -= cost.crystal;
            self.deuterium -= cost.deuterium;
            true
        } else {
            false
        }
    }

    /// Scale the bundle by `numerator / denominator` using integer math.
    ///
    /// Rounds down per component. Used for debris yield (a percentage
    /// of build cost).
    #[must_use]
    pub const fn scaled(&self, numerator: u64, denominator: u64) -> Self {
        Self {
            metal: self.metal * numerator / denominator,
            crystal: self.crystal * numerator / denominator,
            deuterium: self.deuterium * numerator / denominator,
        }
    }

    /// Drop the deuterium component.
    ///
    /// Debris only ever holds metal and crystal.
    #[must_use]
    pub const fn without_deuterium(&self) -> Self {
        Self {
            metal: self.metal,
            crystal: self.crystal,
            deuterium: 0,
        }
    }

    /// Move up to `capacity` total units out of this bundle.
    ///
    /// Drains metal first, then crystal, then deuterium against the
    /// shared capacity - a stable order so recycling is deterministic.
    /// Returns what was taken; `self` is decremented by the same amount.
    pub fn drain_up_to(&mut self, capacity: u64) -> Resources {
        let mut remaining = capacity;
        let mut taken = Resources::ZERO;

        let metal = self.metal.min(remaining);
        self.metal -= metal;
        taken.metal = metal;
        remaining -= metal;

        let crystal = self.crystal.min(remaining);
        self.crystal -= crystal;
        taken.crystal = crystal;
        remaining -= crystal;

        let deuterium = self.deuterium.min(remaining);
        self.deuterium -= deuterium;
        taken.deuterium = deuterium;

        taken
    }
}

impl std::ops::Add for Resources {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            metal: self.metal.saturating_add(rhs.metal),
            crystal: self.crystal.saturating_add(rhs.crystal),
            deuterium: self.deuterium.saturating_add(rhs.deuterium),
        }
    }
}

impl std::ops::AddAssign for Resources {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_success_and_failure() {
        let mut stock = Resources::new(100, 50, 10);

        assert!(stock.spend(Resources::new(40, 50, 0)));
        assert_eq!(stock, Resources::new(60, 0, 10));

        // Cannot cover the crystal component; stock unchanged
        assert!(!stock.spend(Resources::new(10, 1, 0)));
        assert_eq!(stock, Resources::new(60, 0, 10));
    }

    #[test]
    fn test_scaled_rounds_down() {
        let cost = Resources::new(3000, 1001, 500);
        let debris = cost.scaled(30, 100);
        assert_eq!(debris, Resources::new(900, 300, 150));
    }

    #[test]
    fn test_drain_order_and_capacity() {
        let mut field = Resources::new(100, 200, 50);

        let taken = field.drain_up_to(250);
        // Metal first, then crystal, deuterium untouched
        assert_eq!(taken, Resources::new(100, 150, 0));
        assert_eq!(field, Resources::new(0, 50, 50));

        let rest = field.drain_up_to(1000);
        assert_eq!(rest, Resources::new(0, 50, 50));
        assert!(field.is_empty());
    }

    #[test]
    fn test_add_saturates() {
        let a = Resources::new(u64::MAX, 0, 0);
        let b = Resources::new(1, 1, 1);
        let sum = a + b;
        assert_eq!(sum.metal, u64::MAX);
        assert_eq!(sum.crystal, 1);
    }
}
