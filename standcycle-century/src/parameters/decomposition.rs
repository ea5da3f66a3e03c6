//! Decomposition engine parameters.
//!
//! Defaults follow the Century model's surface/soil litter and SOM cascade:
//! structural and metabolic litter feed the active SOM1 pools, lignin is
//! routed to the slow SOM2 pool, and SOM2 feeds the passive SOM3 pool, each
//! step losing a respiration fraction as CO2.

use crate::pool::PoolKind;
use serde::{Deserialize, Serialize};

/// Parameters for the litter/SOM decomposition cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionParameters {
    /// Intrinsic decay rate of surface structural litter.
    /// unit: 1/year
    /// default: 3.9
    pub surface_structural_decay: f64,

    /// Intrinsic decay rate of soil structural litter.
    /// unit: 1/year
    /// default: 4.9
    pub soil_structural_decay: f64,

    /// Intrinsic decay rate of surface metabolic litter.
    /// unit: 1/year
    /// default: 14.8
    pub surface_metabolic_decay: f64,

    /// Intrinsic decay rate of soil metabolic litter.
    /// unit: 1/year
    /// default: 18.5
    pub soil_metabolic_decay: f64,

    /// Intrinsic decay rate of dead coarse roots.
    /// unit: 1/year
    /// default: 0.3
    pub coarse_root_decay: f64,

    /// Intrinsic decay rate of surface active SOM (SOM1).
    /// unit: 1/year
    /// default: 6.0
    pub som1_surface_decay: f64,

    /// Intrinsic decay rate of soil active SOM (SOM1).
    /// unit: 1/year
    /// default: 7.3
    pub som1_soil_decay: f64,

    /// Intrinsic decay rate of slow SOM (SOM2).
    /// unit: 1/year
    /// default: 0.2
    pub som2_decay: f64,

    /// Intrinsic decay rate of passive SOM (SOM3).
    /// unit: 1/year
    /// default: 0.0045
    pub som3_decay: f64,

    /// Exponential lignin shielding coefficient for structural decay,
    /// applied as `exp(-coeff * lignin_fraction)`.
    /// default: 3.0
    pub lignin_decay_effect: f64,

    /// Upper bound on structural carbon considered decomposable in one
    /// month; deep litter beds decompose no faster than this cap allows.
    /// unit: g C / m2
    /// default: 5000.0
    pub structural_carbon_cap: f64,

    /// Respiration fraction of structural flow routed to surface SOM1.
    /// default: 0.45
    pub structural_surface_co2: f64,

    /// Respiration fraction of structural flow routed to soil SOM1.
    /// default: 0.55
    pub structural_soil_co2: f64,

    /// Respiration fraction of the lignin flow routed to SOM2.
    /// default: 0.3
    pub lignin_to_som2_co2: f64,

    /// Respiration fraction of metabolic flow routed to SOM1.
    /// default: 0.55
    pub metabolic_co2: f64,

    /// Respiration fraction of surface SOM1 flow routed to SOM2.
    /// default: 0.6
    pub som1_surface_co2: f64,

    /// Intercept of the sand-dependent respiration fraction for soil SOM1
    /// (`intercept + slope * sand`).
    /// default: 0.17
    pub som1_soil_co2_intercept: f64,

    /// Sand slope of the soil SOM1 respiration fraction.
    /// default: 0.68
    pub som1_soil_co2_sand_slope: f64,

    /// Respiration fraction of SOM2 flow routed to SOM3.
    /// default: 0.55
    pub som2_co2: f64,

    /// Mineral nitrogen never drawn below this floor by immobilization.
    /// unit: g N / m2
    /// default: 0.01
    pub mineral_n_floor: f64,

    /// Maximum (nitrogen-starved) C:N target of surface SOM1, the
    /// intercept of the aboveground decomposition-ratio regression.
    /// default: 16.0
    pub surface_som1_cn_max: f64,

    /// Minimum (nitrogen-rich) C:N target of surface SOM1.
    /// default: 10.0
    pub surface_som1_cn_min: f64,

    /// Source-material nitrogen content (g N per g biomass) at which the
    /// aboveground regression reaches the minimum ratio.
    /// default: 0.02
    pub surface_som1_n_saturation: f64,

    /// Maximum C:N target of soil SOM1 when mineral N is absent.
    /// default: 14.0
    pub soil_som1_cn_max: f64,

    /// Minimum C:N target of soil SOM1 at mineral-N saturation.
    /// default: 3.0
    pub soil_som1_cn_min: f64,

    /// C:N targets of SOM2 at zero mineral N and at saturation.
    /// default: [20.0, 12.0]
    pub som2_cn_range: [f64; 2],

    /// C:N targets of SOM3 at zero mineral N and at saturation.
    /// default: [8.0, 6.0]
    pub som3_cn_range: [f64; 2],

    /// Mineral nitrogen stock treated as saturating for the belowground
    /// decomposition-ratio interpolation.
    /// unit: g N / m2
    /// default: 2.0
    pub mineral_n_saturation: f64,

    /// Tuning multiplier on every monthly decomposition flow.
    /// default: 1.0
    pub month_adjust: f64,
}

impl Default for DecompositionParameters {
    fn default() -> Self {
        Self {
            surface_structural_decay: 3.9,
            soil_structural_decay: 4.9,
            surface_metabolic_decay: 14.8,
            soil_metabolic_decay: 18.5,
            coarse_root_decay: 0.3,
            som1_surface_decay: 6.0,
            som1_soil_decay: 7.3,
            som2_decay: 0.2,
            som3_decay: 0.0045,
            lignin_decay_effect: 3.0,
            structural_carbon_cap: 5000.0,
            structural_surface_co2: 0.45,
            structural_soil_co2: 0.55,
            lignin_to_som2_co2: 0.3,
            metabolic_co2: 0.55,
            som1_surface_co2: 0.6,
            som1_soil_co2_intercept: 0.17,
            som1_soil_co2_sand_slope: 0.68,
            som2_co2: 0.55,
            mineral_n_floor: 0.01,
            surface_som1_cn_max: 16.0,
            surface_som1_cn_min: 10.0,
            surface_som1_n_saturation: 0.02,
            soil_som1_cn_max: 14.0,
            soil_som1_cn_min: 3.0,
            som2_cn_range: [20.0, 12.0],
            som3_cn_range: [8.0, 6.0],
            mineral_n_saturation: 2.0,
            month_adjust: 1.0,
        }
    }
}

impl DecompositionParameters {
    /// Intrinsic decay rate for a pool kind. Dead wood uses the species
    /// rate supplied at deposition time, so its arena default is zero.
    pub fn decay_rate(&self, kind: PoolKind) -> f64 {
        match kind {
            PoolKind::SurfaceMetabolic => self.surface_metabolic_decay,
            PoolKind::SurfaceStructural => self.surface_structural_decay,
            PoolKind::SoilMetabolic => self.soil_metabolic_decay,
            PoolKind::SoilStructural => self.soil_structural_decay,
            PoolKind::DeadWood => 0.0,
            PoolKind::CoarseRoots => self.coarse_root_decay,
            PoolKind::Som1Surface => self.som1_surface_decay,
            PoolKind::Som1Soil => self.som1_soil_decay,
            PoolKind::Som2 => self.som2_decay,
            PoolKind::Som3 => self.som3_decay,
        }
    }
}
