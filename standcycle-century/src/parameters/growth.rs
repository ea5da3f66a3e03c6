//! Growth engine parameters.

use serde::{Deserialize, Serialize};

/// How the foliage- and wood-derived leaf-area indices are combined before
/// the light limit. The lineage this model descends from changed the rule
/// between versions without a stated rationale, so it is a configuration
/// choice rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LaiCombination {
    Minimum,
    #[default]
    Average,
    WoodOnly,
}

/// Parameters shared by every cohort's monthly growth step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthParameters {
    /// Extra flat monthly mortality fraction of total biomass applied
    /// during the pre-establishment spin-up phase.
    /// unit: 1/month
    /// default: 0.0 (disabled outside spin-up runs)
    pub spinup_mortality_fraction: f64,

    /// Whether the run is in the spin-up phase.
    /// default: false
    pub spin_up: bool,

    /// Floor on leaf NPP as a fraction of wood biomass, so new cohorts
    /// always retain some foliage.
    /// unit: dimensionless
    /// default: 0.002
    pub leaf_npp_floor: f64,

    /// Fraction of wood mortality additionally deposited as coarse-root
    /// litter.
    /// default: 0.3
    pub coarse_root_fraction: f64,

    /// Fraction of foliage mortality additionally deposited as fine-root
    /// litter.
    /// default: 0.5
    pub fine_root_fraction: f64,

    /// Carbon mass fraction of dry biomass.
    /// default: 0.47
    pub carbon_fraction: f64,

    /// Light-extinction coefficient of the LAI limit.
    /// default: 0.47
    pub lai_light_coefficient: f64,

    /// LAI combination strategy.
    pub lai_combination: LaiCombination,

    /// Month in which externally supplied defoliation is applied.
    /// default: 7 (July)
    pub defoliation_month: u8,

    /// C:N mass ratio of defoliation frass.
    /// default: 30.0
    pub frass_cn: f64,

    /// Lignin fraction of defoliation frass.
    /// default: 0.1
    pub frass_lignin: f64,

    /// Inclusive month window in which banked resorbed nitrogen may be
    /// spent on new growth.
    /// default: (3, 6) (March through June)
    pub resorption_window: (u8, u8),

    /// Belowground NPP carbon as a fraction of aboveground NPP carbon
    /// (root:shoot allocation).
    /// default: 0.35
    pub root_shoot_ratio: f64,

    /// Minimum seed biomass of a newly established cohort.
    /// unit: g biomass / m2
    /// default: 1.0
    pub establishment_floor: f64,

    /// Scale of establishment seed biomass relative to the species
    /// maximum.
    /// default: 0.002
    pub establishment_scale: f64,

    /// Exponential crowding penalty on establishment seed biomass.
    /// default: 1.6
    pub establishment_crowding: f64,
}

impl Default for GrowthParameters {
    fn default() -> Self {
        Self {
            spinup_mortality_fraction: 0.0,
            spin_up: false,
            leaf_npp_floor: 0.002,
            coarse_root_fraction: 0.3,
            fine_root_fraction: 0.5,
            carbon_fraction: 0.47,
            lai_light_coefficient: 0.47,
            lai_combination: LaiCombination::default(),
            defoliation_month: 7,
            frass_cn: 30.0,
            frass_lignin: 0.1,
            resorption_window: (3, 6),
            root_shoot_ratio: 0.35,
            establishment_floor: 1.0,
            establishment_scale: 0.002,
            establishment_crowding: 1.6,
        }
    }
}
