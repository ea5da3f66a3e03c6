//! Site mineral-nitrogen balance.
//!
//! Mineral nitrogen is the one stock mutated by every cohort's growth step
//! within a month, so all mutation goes through this single register. The
//! sequential-cohort discipline in [`crate::site`] makes draw order
//! deterministic; first-processed cohorts get priority access.

use serde::{Deserialize, Serialize};

/// Mineral nitrogen considered effectively exhausted below this amount.
pub const MINERAL_N_EPSILON: f64 = 1e-7;

/// Single-writer register for a site's plant-available mineral nitrogen,
/// in g N / m2.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NitrogenLedger {
    mineral_n: f64,
}

impl NitrogenLedger {
    pub fn new(initial_mineral_n: f64) -> Self {
        debug_assert!(initial_mineral_n >= 0.0);
        Self {
            mineral_n: initial_mineral_n.max(0.0),
        }
    }

    pub fn mineral_n(&self) -> f64 {
        self.mineral_n
    }

    pub fn is_exhausted(&self) -> bool {
        self.mineral_n <= MINERAL_N_EPSILON
    }

    /// Release mineralized nitrogen into the stock.
    pub fn deposit(&mut self, amount: f64) {
        debug_assert!(amount.is_finite() && amount >= 0.0, "negative N deposit");
        self.mineral_n += amount.max(0.0);
    }

    /// Draw nitrogen for plant uptake, capped at availability. The stock is
    /// driven to exactly zero, never below; shortfall is not an error.
    pub fn withdraw(&mut self, demand: f64) -> f64 {
        debug_assert!(demand.is_finite() && demand >= 0.0, "negative N demand");
        let drawn = demand.clamp(0.0, self.mineral_n);
        self.mineral_n -= drawn;
        drawn
    }

    /// Draw nitrogen for decomposer immobilization, leaving at least
    /// `floor` in the stock. Returns the amount actually immobilized.
    pub fn immobilize(&mut self, demand: f64, floor: f64) -> f64 {
        debug_assert!(demand.is_finite() && demand >= 0.0);
        let available = (self.mineral_n - floor).max(0.0);
        let drawn = demand.clamp(0.0, available);
        self.mineral_n -= drawn;
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_clamps_to_zero() {
        let mut ledger = NitrogenLedger::new(2.0);
        assert_eq!(ledger.withdraw(1.5), 1.5);
        assert_eq!(ledger.withdraw(3.0), 0.5);
        assert_eq!(ledger.mineral_n(), 0.0);
        assert!(ledger.is_exhausted());
        assert_eq!(ledger.withdraw(1.0), 0.0);
    }

    #[test]
    fn test_immobilize_respects_floor() {
        let mut ledger = NitrogenLedger::new(1.0);
        let drawn = ledger.immobilize(5.0, 0.01);
        assert!((drawn - 0.99).abs() < 1e-12);
        assert!((ledger.mineral_n() - 0.01).abs() < 1e-12);
        // The stock sits at the floor up to float residue; further draws
        // yield nothing beyond that residue
        assert!(ledger.immobilize(1.0, 0.01).abs() < 1e-12);
        assert!((ledger.mineral_n() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_deposit_then_withdraw_round_trips() {
        let mut ledger = NitrogenLedger::new(0.0);
        ledger.deposit(4.2);
        assert_eq!(ledger.withdraw(4.2), 4.2);
        assert!(ledger.is_exhausted());
    }
}
