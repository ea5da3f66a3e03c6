//! Live tree cohorts.

use serde::{Deserialize, Serialize};
use standcycle_core::SpeciesId;

/// A same-species, same-establishment group of trees at one site.
///
/// Biomass is aggregate live mass in g / m2, split into wood and foliage.
/// Both components stay non-negative; the growth engine enforces the
/// mortality bound before applying any delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cohort {
    pub species: SpeciesId,
    /// Months since establishment.
    pub age_months: u32,
    pub wood_biomass: f64,
    pub leaf_biomass: f64,
    /// Nitrogen resorbed from senescing foliage, banked for reuse during
    /// the spring resorption window.
    pub resorbed_n: f64,
}

impl Cohort {
    pub fn new(species: SpeciesId, wood_biomass: f64, leaf_biomass: f64) -> Self {
        debug_assert!(wood_biomass >= 0.0 && leaf_biomass >= 0.0);
        Self {
            species,
            age_months: 0,
            wood_biomass,
            leaf_biomass,
            resorbed_n: 0.0,
        }
    }

    pub fn age_years(&self) -> f64 {
        f64::from(self.age_months) / 12.0
    }

    pub fn total_biomass(&self) -> f64 {
        self.wood_biomass + self.leaf_biomass
    }

    /// A cohort with no remaining biomass is removed by the site driver.
    pub fn is_dead(&self) -> bool {
        self.total_biomass() <= 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_conversion() {
        let mut cohort = Cohort::new(SpeciesId(0), 100.0, 20.0);
        assert_eq!(cohort.age_years(), 0.0);
        cohort.age_months = 30;
        assert!((cohort.age_years() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_death_threshold() {
        let mut cohort = Cohort::new(SpeciesId(0), 1.0, 0.5);
        assert!(!cohort.is_dead());
        cohort.wood_biomass = 0.0;
        cohort.leaf_biomass = 0.0;
        assert!(cohort.is_dead());
    }
}
