//! Per-site state and the monthly update driver.
//!
//! A site owns its cohorts, its litter and soil pools, and its mineral
//! nitrogen stock. One [`Site::advance_month`] call runs the full monthly
//! sequence: cohort growth and mortality first (oldest cohort first, so
//! nitrogen competition is deterministic), then decomposition across all
//! pools.

use crate::cohort::Cohort;
use crate::decomposition::{DecayEnvironment, DecayTotals, DecompositionEngine};
use crate::growth::CohortGrowthEngine;
use crate::nitrogen::NitrogenLedger;
use crate::pool::{PoolArena, PoolKind};
use standcycle_core::{
    EcoregionId, EcoregionParameters, ModelResult, MonthlyClimate, SimulationClock, SpeciesId,
    SpeciesTable,
};

/// Monthly flux accumulators for one site, reset at each month boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteTotals {
    pub ag_npp_carbon: f64,
    pub bg_npp_carbon: f64,
    pub litterfall_carbon: f64,
    pub heterotrophic_respiration: f64,
    pub age_mortality: f64,
    pub frass_carbon: f64,
    pub n_uptake: f64,
    pub gross_mineralization: f64,
}

impl SiteTotals {
    /// Fold another site's monthly totals into this one.
    pub fn accumulate(&mut self, other: &SiteTotals) {
        self.ag_npp_carbon += other.ag_npp_carbon;
        self.bg_npp_carbon += other.bg_npp_carbon;
        self.litterfall_carbon += other.litterfall_carbon;
        self.heterotrophic_respiration += other.heterotrophic_respiration;
        self.age_mortality += other.age_mortality;
        self.frass_carbon += other.frass_carbon;
        self.n_uptake += other.n_uptake;
        self.gross_mineralization += other.gross_mineralization;
    }
}

/// One simulated stand: a cohort list plus the shared soil state.
pub struct Site {
    id: u32,
    ecoregion: EcoregionId,
    cohorts: Vec<Cohort>,
    arena: PoolArena,
    ledger: NitrogenLedger,
    totals: SiteTotals,
}

impl Site {
    pub fn new(
        id: u32,
        ecoregion: EcoregionId,
        ecoregion_parameters: &EcoregionParameters,
        decomposition: &DecompositionEngine,
    ) -> Self {
        let parameters = decomposition.parameters();
        Self {
            id,
            ecoregion,
            cohorts: Vec::new(),
            arena: PoolArena::new(|kind| parameters.decay_rate(kind)),
            ledger: NitrogenLedger::new(ecoregion_parameters.initial_mineral_n),
            totals: SiteTotals::default(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn ecoregion(&self) -> EcoregionId {
        self.ecoregion
    }

    pub fn cohorts(&self) -> &[Cohort] {
        &self.cohorts
    }

    pub fn arena(&self) -> &PoolArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut PoolArena {
        &mut self.arena
    }

    pub fn ledger(&self) -> &NitrogenLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut NitrogenLedger {
        &mut self.ledger
    }

    pub fn totals(&self) -> &SiteTotals {
        &self.totals
    }

    pub fn total_biomass(&self) -> f64 {
        self.cohorts.iter().map(Cohort::total_biomass).sum()
    }

    /// Live biomass plus all detrital and soil carbon, for conservation
    /// checks.
    pub fn total_carbon(&self, carbon_fraction: f64) -> f64 {
        self.total_biomass() * carbon_fraction + self.arena.total_carbon()
    }

    /// Seed a new cohort of the given species, debiting mineral N.
    pub fn establish(
        &mut self,
        species_id: SpeciesId,
        species_table: &SpeciesTable,
        growth: &CohortGrowthEngine,
    ) -> ModelResult<()> {
        let species = species_table.get(species_id)?;
        let site_biomass = self.total_biomass();
        let cohort = growth.establish(species_id, species, site_biomass, &mut self.ledger);
        self.cohorts.push(cohort);
        Ok(())
    }

    /// Place a cohort directly, for initialization from inventory data.
    pub fn add_cohort(&mut self, cohort: Cohort) {
        self.cohorts.push(cohort);
    }

    /// Run one month: cohort growth in deterministic order, then
    /// decomposition over every pool. A fatal error aborts the site and
    /// leaves its state partially advanced; callers should discard it.
    pub fn advance_month(
        &mut self,
        species_table: &SpeciesTable,
        ecoregion_parameters: &EcoregionParameters,
        climate: &MonthlyClimate,
        clock: SimulationClock,
        growth: &CohortGrowthEngine,
        decomposition: &DecompositionEngine,
    ) -> ModelResult<&SiteTotals> {
        self.totals = SiteTotals::default();
        self.arena.reset_month();

        // Oldest cohorts draw nitrogen first; species id breaks ties so
        // replayed runs are bit-identical.
        self.cohorts
            .sort_by(|a, b| b.age_months.cmp(&a.age_months).then(a.species.0.cmp(&b.species.0)));

        for index in 0..self.cohorts.len() {
            let site_biomass = self.total_biomass();
            let species = species_table.get(self.cohorts[index].species)?;
            let month = growth.compute_change(
                &mut self.cohorts[index],
                species,
                ecoregion_parameters,
                climate,
                clock,
                self.id,
                site_biomass,
                &mut self.arena,
                &mut self.ledger,
            )?;
            self.totals.ag_npp_carbon += month.ag_npp_carbon;
            self.totals.bg_npp_carbon += month.bg_npp_carbon;
            self.totals.litterfall_carbon += month.litterfall_carbon;
            self.totals.age_mortality += month.age_mortality;
            self.totals.frass_carbon += month.frass_carbon;
            self.totals.n_uptake += month.n_uptake;
        }
        self.cohorts.retain(|cohort| !cohort.is_dead());

        let environment = DecayEnvironment::from_climate(climate, ecoregion_parameters);
        let mut decay = DecayTotals::default();
        for kind in PoolKind::ALL {
            decomposition.advance(kind, &mut self.arena, &mut self.ledger, &environment, &mut decay);
        }
        self.totals.heterotrophic_respiration = decay.heterotrophic_respiration;
        self.totals.gross_mineralization = self.arena.gross_mineralization();

        Ok(&self.totals)
    }
}
