//! Multi-site driver.
//!
//! Sites never exchange state within a month, so the landscape advances
//! them in parallel with rayon and folds their totals at the month
//! boundary. Within a site, cohort processing stays sequential.

use crate::decomposition::DecompositionEngine;
use crate::growth::CohortGrowthEngine;
use crate::site::{Site, SiteTotals};
use rayon::prelude::*;
use standcycle_core::{
    EcoregionId, EcoregionTable, ModelError, ModelResult, MonthlyClimate, SimulationClock,
    SpeciesId, SpeciesTable,
};
use std::collections::HashMap;

/// All simulated sites plus the shared parameter tables and engines.
pub struct Landscape {
    sites: Vec<Site>,
    species: SpeciesTable,
    ecoregions: EcoregionTable,
    growth: CohortGrowthEngine,
    decomposition: DecompositionEngine,
}

impl Landscape {
    pub fn new(
        species: SpeciesTable,
        ecoregions: EcoregionTable,
        growth: CohortGrowthEngine,
        decomposition: DecompositionEngine,
    ) -> Self {
        Self {
            sites: Vec::new(),
            species,
            ecoregions,
            growth,
            decomposition,
        }
    }

    /// Add a site in the given ecoregion and return its id.
    pub fn add_site(&mut self, ecoregion: EcoregionId) -> ModelResult<u32> {
        let parameters = self.ecoregions.get(ecoregion)?;
        let id = self.sites.len() as u32;
        self.sites
            .push(Site::new(id, ecoregion, parameters, &self.decomposition));
        Ok(id)
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, id: u32) -> Option<&Site> {
        self.sites.get(id as usize)
    }

    pub fn site_mut(&mut self, id: u32) -> Option<&mut Site> {
        self.sites.get_mut(id as usize)
    }

    pub fn species(&self) -> &SpeciesTable {
        &self.species
    }

    pub fn ecoregions(&self) -> &EcoregionTable {
        &self.ecoregions
    }

    /// Seed a cohort of `species` on site `site_id`.
    pub fn establish(&mut self, site_id: u32, species: SpeciesId) -> ModelResult<()> {
        let site = self
            .sites
            .get_mut(site_id as usize)
            .ok_or_else(|| ModelError::Error(format!("no site with id {site_id}")))?;
        site.establish(species, &self.species, &self.growth)
    }

    /// Advance every site one month under its ecoregion's climate and
    /// return the landscape-wide totals. The first fatal site error
    /// aborts the month.
    pub fn advance_month(
        &mut self,
        climate: &HashMap<EcoregionId, MonthlyClimate>,
        clock: SimulationClock,
    ) -> ModelResult<SiteTotals> {
        let species = &self.species;
        let ecoregions = &self.ecoregions;
        let growth = &self.growth;
        let decomposition = &self.decomposition;

        self.sites
            .par_iter_mut()
            .map(|site| {
                let region = site.ecoregion();
                let parameters = ecoregions.get(region)?;
                let climate = climate
                    .get(&region)
                    .ok_or(ModelError::UnknownEcoregion(region))?;
                site.advance_month(species, parameters, climate, clock, growth, decomposition)
                    .copied()
            })
            .try_reduce(SiteTotals::default, |mut folded, totals| {
                folded.accumulate(&totals);
                Ok(folded)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{DecompositionParameters, GrowthParameters};
    use standcycle_core::{EcoregionParameters, SpeciesParameters};

    fn landscape() -> Landscape {
        Landscape::new(
            SpeciesTable::new(vec![SpeciesParameters::default()]),
            EcoregionTable::new(vec![EcoregionParameters::default()]),
            CohortGrowthEngine::from_parameters(GrowthParameters::default()),
            DecompositionEngine::from_parameters(DecompositionParameters::default()),
        )
    }

    fn default_climate() -> HashMap<EcoregionId, MonthlyClimate> {
        HashMap::from([(EcoregionId(0), MonthlyClimate::default())])
    }

    #[test]
    fn test_advance_month_aggregates_across_sites() {
        let mut landscape = landscape();
        for _ in 0..3 {
            let id = landscape.add_site(EcoregionId(0)).unwrap();
            landscape.establish(id, SpeciesId(0)).unwrap();
        }

        let totals = landscape
            .advance_month(&default_climate(), SimulationClock::new(1, 6))
            .unwrap();
        let summed: f64 = landscape
            .sites()
            .iter()
            .map(|site| site.totals().ag_npp_carbon)
            .sum();
        assert!((totals.ag_npp_carbon - summed).abs() < 1e-9);
        assert!(totals.ag_npp_carbon > 0.0);
    }

    #[test]
    fn test_missing_climate_is_fatal() {
        let mut landscape = landscape();
        landscape.add_site(EcoregionId(0)).unwrap();

        let empty = HashMap::new();
        let result = landscape.advance_month(&empty, SimulationClock::new(1, 1));
        assert!(matches!(result, Err(ModelError::UnknownEcoregion(_))));
    }

    #[test]
    fn test_unknown_ecoregion_rejected_at_site_creation() {
        let mut landscape = landscape();
        assert!(landscape.add_site(EcoregionId(9)).is_err());
    }

    #[test]
    fn test_sites_in_same_ecoregion_evolve_identically() {
        let mut landscape = landscape();
        let a = landscape.add_site(EcoregionId(0)).unwrap();
        let b = landscape.add_site(EcoregionId(0)).unwrap();
        landscape.establish(a, SpeciesId(0)).unwrap();
        landscape.establish(b, SpeciesId(0)).unwrap();

        let mut clock = SimulationClock::new(1, 1);
        for _ in 0..24 {
            landscape.advance_month(&default_climate(), clock).unwrap();
            clock = clock.next();
        }
        let site_a = landscape.site(a).unwrap();
        let site_b = landscape.site(b).unwrap();
        assert_eq!(site_a.total_biomass(), site_b.total_biomass());
        assert_eq!(site_a.ledger().mineral_n(), site_b.ledger().mineral_n());
    }
}
