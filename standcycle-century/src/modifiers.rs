//! Dimensionless environmental limiting factors.
//!
//! All growth limits return values in [0,1] (the water limit has a 0.01
//! floor so production never hits an exact zero in drought months). The
//! decomposition factors combine temperature, moisture and aeration into
//! the scalar rate modifier used by the decomposition engine.

use crate::parameters::LaiCombination;
use standcycle_core::{EcoregionParameters, MonthlyClimate, SpeciesParameters};

/// Self-thinning ceiling: approaches 0 as site biomass nears the maximum.
pub fn capacity_limit(site_biomass: f64, max_biomass: f64) -> f64 {
    if max_biomass <= 0.0 {
        return 0.0;
    }
    let crowding = (5.0 * site_biomass / max_biomass).exp() / 5.0_f64.exp();
    (1.0 - crowding.min(1.0)).clamp(0.0, 1.0)
}

/// Leaf-area index from foliage carbon (saturating exponential).
pub fn lai_from_foliage(leaf_carbon: f64, species: &SpeciesParameters) -> f64 {
    species.max_lai * (1.0 - (-species.leaf_lai_coeff * leaf_carbon.max(0.0)).exp())
}

/// Leaf-area index from wood carbon (Michaelis-Menten).
pub fn lai_from_wood(wood_carbon: f64, species: &SpeciesParameters) -> f64 {
    let wood_carbon = wood_carbon.max(0.0);
    species.max_lai * wood_carbon / (species.wood_lai_half_sat + wood_carbon)
}

/// Light limitation of production from canopy leaf area.
///
/// The foliage- and wood-derived indices are combined by the configured
/// strategy, then passed through `1 - exp(-k * lai)`.
pub fn lai_limit(
    leaf_carbon: f64,
    wood_carbon: f64,
    species: &SpeciesParameters,
    combination: LaiCombination,
    light_coefficient: f64,
) -> f64 {
    let rlai = lai_from_foliage(leaf_carbon, species);
    let tlai = lai_from_wood(wood_carbon, species);
    let lai = match combination {
        LaiCombination::Minimum => rlai.min(tlai),
        LaiCombination::Average => 0.5 * (rlai + tlai),
        LaiCombination::WoodOnly => tlai,
    };
    (1.0 - (-light_coefficient * lai).exp()).clamp(0.0, 1.0)
}

/// Water limitation from the supply/demand ratio, mapped linearly through
/// the species `pprpts` thresholds onto [0.01, 1.0].
pub fn water_limit(
    climate: &MonthlyClimate,
    ecoregion: &EcoregionParameters,
    species: &SpeciesParameters,
) -> f64 {
    let ratio = climate.water_to_pet_ratio();
    let [pprpts1, pprpts2, pprpts3] = species.pprpts;
    let intercept = pprpts1 + pprpts2 * ecoregion.water_capacity;
    let span = pprpts3 - intercept;
    if span.abs() < 1e-9 {
        return 1.0;
    }
    (1.0 + (ratio - pprpts3) / span).clamp(0.01, 1.0)
}

/// Parton-Innis growing-degree response to soil temperature.
///
/// `frac = (Tmax - T) / (Tmax - Topt)`; zero at or above the maximum, one
/// at the optimum, falling off on both sides.
pub fn temperature_limit(soil_temperature: f64, species: &SpeciesParameters) -> f64 {
    let span = species.maximum_temperature - species.optimum_temperature;
    debug_assert!(span > 0.0);
    let frac = (species.maximum_temperature - soil_temperature) / span;
    if frac <= 0.0 {
        return 0.0;
    }
    let a4 = species.temperature_shape;
    let a5 = species.temperature_skew;
    let limit = (a4 / a5 * (1.0 - frac.powf(a5))).exp() * frac.powf(a4);
    limit.clamp(0.0, 1.0)
}

// Soil temperature response constants for decomposition (arctangent form
// normalised to 1.0 at 30 C).
const TEFF_CENTER: f64 = 15.4;
const TEFF_BASE: f64 = 11.75;
const TEFF_RANGE: f64 = 29.7;
const TEFF_SLOPE: f64 = 0.031;

fn decay_temperature_term(soil_temperature: f64) -> f64 {
    use std::f64::consts::PI;
    let term = |t: f64| TEFF_BASE + (TEFF_RANGE / PI) * (PI * TEFF_SLOPE * (t - TEFF_CENTER)).atan();
    (term(soil_temperature) / term(30.0)).clamp(0.01, 1.0)
}

fn decay_moisture_term(water_to_pet_ratio: f64) -> f64 {
    if water_to_pet_ratio > 9.0 {
        1.0
    } else {
        1.0 / (1.0 + 30.0 * (-8.5 * water_to_pet_ratio).exp())
    }
}

/// Combined temperature-moisture decomposition rate modifier in [0,1].
pub fn decay_factor(climate: &MonthlyClimate) -> f64 {
    decay_temperature_term(climate.soil_temperature) * decay_moisture_term(climate.water_to_pet_ratio())
}

// Saturation thresholds for the anaerobic penalty: no penalty below a
// supply/demand ratio of ANAEROBIC_ONSET, full penalty at ANAEROBIC_FULL.
const ANAEROBIC_ONSET: f64 = 1.5;
const ANAEROBIC_FULL: f64 = 3.0;
const ANAEROBIC_MINIMUM: f64 = 0.3;

/// Anaerobic-conditions multiplier for soil-located pools.
///
/// Waterlogged months slow soil decomposition toward `ANAEROBIC_MINIMUM`;
/// free drainage cancels the penalty.
pub fn anaerobic_effect(climate: &MonthlyClimate, ecoregion: &EcoregionParameters) -> f64 {
    let ratio = climate.water_to_pet_ratio();
    if ratio <= ANAEROBIC_ONSET {
        return 1.0;
    }
    let severity =
        ((ratio - ANAEROBIC_ONSET) / (ANAEROBIC_FULL - ANAEROBIC_ONSET)).clamp(0.0, 1.0);
    let saturated = 1.0 - severity * (1.0 - ANAEROBIC_MINIMUM);
    1.0 - (1.0 - saturated) * (1.0 - ecoregion.soil_drain)
}
