//! Cohort growth-mortality engine.
//!
//! One call to [`CohortGrowthEngine::compute_change`] advances one cohort
//! one month: age and growth mortality, potential productivity under the
//! multiplicative environmental limits, nitrogen limitation and uptake,
//! defoliation, and routing of all dead material into the decomposition
//! engine's input pools. Calls within a month are strictly sequential per
//! site because cohorts contend for the shared mineral-nitrogen stock;
//! first-processed cohorts get priority.

use crate::cohort::Cohort;
use crate::modifiers;
use crate::nitrogen::NitrogenLedger;
use crate::parameters::GrowthParameters;
use crate::pool::{PoolArena, PoolKind};
use log::warn;
use standcycle_core::{
    EcoregionParameters, FoliageHabit, ModelError, ModelResult, MonthlyClimate, SimulationClock,
    SpeciesId, SpeciesParameters, MONTH_FRACTION,
};

// Century-style litter partition: the metabolic share of fresh litter
// falls linearly with the material's lignin:nitrogen ratio.
const METABOLIC_SPLIT_INTERCEPT: f64 = 0.85;
const METABOLIC_SPLIT_SLOPE: f64 = 0.018;
const METABOLIC_SPLIT_MIN: f64 = 0.2;

/// Host-supplied canopy stress, resolved once at engine construction.
///
/// Disturbance modules (insects, fire) plug in here; the engine itself
/// never decides when or how much defoliation happens.
pub trait CanopyDisturbance: Send + Sync {
    /// Fraction of current foliage removed in the defoliation month.
    fn defoliation_fraction(&self, _cohort: &Cohort, _clock: SimulationClock) -> f64 {
        0.0
    }

    /// Additional foliage fraction lost to fire crown scorch.
    fn crown_scorch_fraction(&self, _cohort: &Cohort, _clock: SimulationClock) -> f64 {
        0.0
    }

    /// Fractional reduction of actual ANPP (0 = no stress, 1 = no growth).
    fn growth_reduction(&self, _cohort: &Cohort, _clock: SimulationClock) -> f64 {
        0.0
    }
}

/// The default capability: no external canopy stress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisturbance;

impl CanopyDisturbance for NoDisturbance {}

/// Outputs of one cohort's monthly step, accumulated by the site driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct CohortMonth {
    pub delta_wood: f64,
    pub delta_leaf: f64,
    /// Aboveground NPP as carbon.
    pub ag_npp_carbon: f64,
    /// Belowground NPP as carbon.
    pub bg_npp_carbon: f64,
    /// Carbon deposited into litter pools this month.
    pub litterfall_carbon: f64,
    /// Biomass lost to age-related mortality.
    pub age_mortality: f64,
    /// Carbon diverted through the defoliation frass pathway.
    pub frass_carbon: f64,
    /// Nitrogen drawn for growth (resorbed + mineral).
    pub n_uptake: f64,
}

/// Computes each cohort's monthly biomass change and routes dead biomass
/// into the litter pools.
pub struct CohortGrowthEngine {
    parameters: GrowthParameters,
    disturbance: Box<dyn CanopyDisturbance>,
}

impl CohortGrowthEngine {
    pub fn new() -> Self {
        Self::from_parameters(GrowthParameters::default())
    }

    pub fn from_parameters(parameters: GrowthParameters) -> Self {
        Self {
            parameters,
            disturbance: Box::new(NoDisturbance),
        }
    }

    pub fn with_disturbance(
        parameters: GrowthParameters,
        disturbance: Box<dyn CanopyDisturbance>,
    ) -> Self {
        Self {
            parameters,
            disturbance,
        }
    }

    pub fn parameters(&self) -> &GrowthParameters {
        &self.parameters
    }

    /// Seed biomass for a newly established cohort, crowded out
    /// exponentially as the site fills, then debited against mineral N
    /// under the same uptake rule as monthly growth.
    pub fn establish(
        &self,
        species_id: SpeciesId,
        species: &SpeciesParameters,
        site_biomass: f64,
        ledger: &mut NitrogenLedger,
    ) -> Cohort {
        let p = &self.parameters;
        let crowding =
            (-p.establishment_crowding * site_biomass / species.max_biomass).exp();
        let seed = (p.establishment_scale * species.max_biomass * crowding)
            .max(p.establishment_floor);
        let leaf = seed * species.leaf_fraction;
        let wood = seed - leaf;
        let demand = self.nitrogen_demand(leaf, wood, species);
        ledger.withdraw(demand);
        Cohort::new(species_id, wood, leaf)
    }

    /// Advance one cohort one month.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_change(
        &self,
        cohort: &mut Cohort,
        species: &SpeciesParameters,
        ecoregion: &EcoregionParameters,
        climate: &MonthlyClimate,
        clock: SimulationClock,
        site_id: u32,
        site_biomass: f64,
        arena: &mut PoolArena,
        ledger: &mut NitrogenLedger,
    ) -> ModelResult<CohortMonth> {
        let p = &self.parameters;
        let wood0 = cohort.wood_biomass;
        let leaf0 = cohort.leaf_biomass;
        let pre_total = wood0 + leaf0;

        // 1. Age mortality, independent for wood and leaf.
        let age_factor = (cohort.age_years() / species.longevity * species.mortality_shape)
            .exp()
            / species.mortality_shape.exp();
        let spinup_extra = if p.spin_up {
            p.spinup_mortality_fraction
        } else {
            0.0
        };
        let m_age_wood =
            (wood0 * (MONTH_FRACTION * age_factor + spinup_extra)).clamp(0.0, wood0);
        let mut m_age_leaf =
            (leaf0 * (MONTH_FRACTION * age_factor + spinup_extra)).clamp(0.0, leaf0);

        // 2. Growth mortality: constant wood fraction; leaf fall by habit.
        let m_growth_wood =
            (wood0 * species.monthly_wood_mortality).clamp(0.0, wood0 - m_age_wood);
        let leaf_fall = match species.foliage {
            FoliageHabit::Evergreen => leaf0 / (species.leaf_longevity * 12.0),
            FoliageHabit::Deciduous { drop_month } => {
                // Half the canopy in the drop month, the rest a month later.
                if clock.month == drop_month {
                    leaf0 * 0.5
                } else if clock.month == drop_month % 12 + 1 {
                    leaf0
                } else {
                    0.0
                }
            }
        };
        let mut m_growth_leaf = leaf_fall.clamp(0.0, leaf0 - m_age_leaf);

        for (name, value) in [
            ("wood age mortality", m_age_wood),
            ("leaf age mortality", m_age_leaf),
            ("wood growth mortality", m_growth_wood),
            ("leaf growth mortality", m_growth_leaf),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvariantViolation {
                    site: site_id,
                    message: format!(
                        "{name} is {value} for {} cohort aged {} months",
                        species.name, cohort.age_months
                    ),
                });
            }
        }

        // 3. Potential productivity under the multiplicative limits.
        let leaf_carbon = leaf0 * p.carbon_fraction;
        let wood_carbon = wood0 * p.carbon_fraction;
        let limit_lai = modifiers::lai_limit(
            leaf_carbon,
            wood_carbon,
            species,
            p.lai_combination,
            p.lai_light_coefficient,
        );
        let limit_water = modifiers::water_limit(climate, ecoregion, species);
        let limit_temperature = modifiers::temperature_limit(climate.soil_temperature, species);
        let limit_capacity = modifiers::capacity_limit(site_biomass, species.max_biomass);
        let mut potential = sanitize_npp(
            species.max_anpp
                * MONTH_FRACTION
                * limit_lai
                * limit_water
                * limit_temperature
                * limit_capacity,
            "potential ANPP",
        );

        // 4. Nitrogen limitation on potential production.
        let potential_leaf = potential * species.leaf_fraction;
        let potential_demand =
            self.nitrogen_demand(potential_leaf, potential - potential_leaf, species);
        let resorbed_open = clock.in_window(p.resorption_window.0, p.resorption_window.1);
        let resorbed_available = if resorbed_open { cohort.resorbed_n } else { 0.0 };
        let limit_n = if species.n_fixer || potential_demand <= 1e-9 {
            1.0
        } else {
            ((resorbed_available + ledger.mineral_n()) / potential_demand).min(1.0)
        };
        potential *= limit_n;

        // 5. Actual ANPP: age mortality comes off the top, then the
        // external growth-reduction hook, then the leaf allocation floor.
        let age_mortality = m_age_wood + m_age_leaf;
        let reduction = self
            .disturbance
            .growth_reduction(cohort, clock)
            .clamp(0.0, 1.0);
        let actual = sanitize_npp(
            (potential - age_mortality).max(0.0) * (1.0 - reduction),
            "actual ANPP",
        );
        let (leaf_npp, wood_npp) = if actual > 1e-12 {
            let floor = p.leaf_npp_floor * wood0;
            let realized_fraction =
                ((actual * species.leaf_fraction).max(floor) / actual).min(1.0);
            let leaf_npp = actual * realized_fraction;
            (leaf_npp, actual - leaf_npp)
        } else {
            (0.0, 0.0)
        };

        // 6. Defoliation in the designated month; the defoliated share is
        // removed before senescence so total leaf loss stays within leaf0.
        let mut defoliated = 0.0;
        if clock.month == p.defoliation_month {
            let eaten = self
                .disturbance
                .defoliation_fraction(cohort, clock)
                .clamp(0.0, 1.0);
            let scorched = self
                .disturbance
                .crown_scorch_fraction(cohort, clock)
                .clamp(0.0, 1.0);
            defoliated = ((eaten + scorched) * leaf0).min(leaf0);
        }
        let senescence = m_age_leaf + m_growth_leaf;
        let senescence_room = leaf0 - defoliated;
        if senescence > senescence_room && senescence > 0.0 {
            let scale = (senescence_room / senescence).max(0.0);
            m_age_leaf *= scale;
            m_growth_leaf *= scale;
        }

        // 7. Nitrogen uptake for realized production: banked resorbed N
        // first (inside the spring window), then mineral N up to
        // availability. Shortfall caps uptake; ANPP is not rescaled.
        let demand = self.nitrogen_demand(leaf_npp, wood_npp, species);
        let from_resorbed = if resorbed_open {
            let drawn = demand.min(cohort.resorbed_n);
            cohort.resorbed_n -= drawn;
            drawn
        } else {
            0.0
        };
        let from_mineral = ledger.withdraw(demand - from_resorbed);
        let n_uptake = from_resorbed + from_mineral;

        // 8. Biomass delta and litter routing.
        let wood_mortality = m_age_wood + m_growth_wood;
        let leaf_mortality = m_age_leaf + m_growth_leaf + defoliated;
        let total_mortality = wood_mortality + leaf_mortality;
        if !total_mortality.is_finite() || total_mortality > pre_total + 1e-6 {
            return Err(ModelError::InvariantViolation {
                site: site_id,
                message: format!(
                    "mortality {total_mortality} exceeds biomass {pre_total} for {}",
                    species.name
                ),
            });
        }

        let mut litterfall_carbon = 0.0;

        // Wood mortality: dead-wood pool plus a coarse-root share.
        let wood_litter_c = wood_mortality * p.carbon_fraction;
        arena[PoolKind::DeadWood].add_woody_material(
            wood_litter_c,
            wood_litter_c / species.wood_cn,
            species.wood_lignin,
            species.wood_decay_rate,
        );
        let coarse_c = wood_litter_c * p.coarse_root_fraction;
        arena[PoolKind::CoarseRoots].add_material(
            coarse_c,
            coarse_c / species.coarse_root_cn,
            species.wood_lignin,
        );
        litterfall_carbon += wood_litter_c + coarse_c;

        // Senescent foliage: resorb a nitrogen share, litter the rest,
        // plus a fine-root share belowground.
        let senescent = m_age_leaf + m_growth_leaf;
        let leaf_litter_c = senescent * p.carbon_fraction;
        let leaf_litter_n = leaf_litter_c / species.leaf_cn;
        let resorbed = leaf_litter_n * species.n_resorption_fraction;
        cohort.resorbed_n += resorbed;
        deposit_litter(
            arena,
            true,
            leaf_litter_c,
            leaf_litter_n - resorbed,
            species.leaf_lignin,
        );
        let fine_c = senescent * p.fine_root_fraction * p.carbon_fraction;
        deposit_litter(
            arena,
            false,
            fine_c,
            fine_c / species.fine_root_cn,
            species.fine_root_lignin,
        );
        litterfall_carbon += leaf_litter_c + fine_c;

        // Defoliated foliage: frass pathway with its own C:N and lignin.
        let frass_carbon = defoliated * p.carbon_fraction;
        if frass_carbon > 0.0 {
            deposit_litter(
                arena,
                true,
                frass_carbon,
                frass_carbon / p.frass_cn,
                p.frass_lignin,
            );
            litterfall_carbon += frass_carbon;
        }

        cohort.wood_biomass = (wood0 + wood_npp - wood_mortality).max(0.0);
        cohort.leaf_biomass = (leaf0 + leaf_npp - leaf_mortality).max(0.0);
        cohort.age_months += 1;

        // 9. NPP bookkeeping.
        let ag_npp_carbon = (leaf_npp + wood_npp) * p.carbon_fraction;
        Ok(CohortMonth {
            delta_wood: wood_npp - wood_mortality,
            delta_leaf: leaf_npp - leaf_mortality,
            ag_npp_carbon,
            bg_npp_carbon: ag_npp_carbon * p.root_shoot_ratio,
            litterfall_carbon,
            age_mortality: m_age_wood + m_age_leaf,
            frass_carbon,
            n_uptake,
        })
    }

    /// Nitrogen needed to build the given leaf and wood biomass, including
    /// the proportional root allocation.
    fn nitrogen_demand(&self, leaf_npp: f64, wood_npp: f64, species: &SpeciesParameters) -> f64 {
        let p = &self.parameters;
        let leaf_c = leaf_npp.max(0.0) * p.carbon_fraction;
        let wood_c = wood_npp.max(0.0) * p.carbon_fraction;
        let root_c = (leaf_c + wood_c) * p.root_shoot_ratio;
        leaf_c / species.leaf_cn + wood_c / species.wood_cn + root_c / species.fine_root_cn
    }
}

impl Default for CohortGrowthEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Split fresh litter between the metabolic and structural pool of the
/// given layer. The metabolic share falls with the material's
/// lignin:nitrogen ratio; the structural share carries all the lignin.
fn deposit_litter(arena: &mut PoolArena, surface: bool, carbon: f64, nitrogen: f64, lignin: f64) {
    if carbon <= 0.0 {
        return;
    }
    let (metabolic, structural) = if surface {
        (PoolKind::SurfaceMetabolic, PoolKind::SurfaceStructural)
    } else {
        (PoolKind::SoilMetabolic, PoolKind::SoilStructural)
    };
    let metabolic_share = if nitrogen > 1e-9 {
        let lignin_to_n = lignin * carbon * 2.5 / nitrogen;
        (METABOLIC_SPLIT_INTERCEPT - METABOLIC_SPLIT_SLOPE * lignin_to_n)
            .clamp(METABOLIC_SPLIT_MIN, METABOLIC_SPLIT_INTERCEPT)
    } else {
        0.0
    };
    let metabolic_c = carbon * metabolic_share;
    let metabolic_n = nitrogen * metabolic_share;
    arena[metabolic].add_material(metabolic_c, metabolic_n, 0.0);
    let structural_c = carbon - metabolic_c;
    if structural_c > 0.0 {
        // Lignin concentrates in the structural share.
        let structural_lignin = (lignin * carbon / structural_c).min(1.0);
        arena[structural].add_material(structural_c, nitrogen - metabolic_n, structural_lignin);
    }
}

fn sanitize_npp(value: f64, what: &str) -> f64 {
    if !value.is_finite() {
        warn!("non-finite {what} clamped to zero");
        0.0
    } else {
        value.max(0.0)
    }
}
