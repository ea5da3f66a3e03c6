//! TOML loading and validation of the species and ecoregion tables.
//!
//! Validation runs before any simulation step so that bad fractions or
//! impossible response curves surface as configuration errors instead of
//! mid-run invariant violations.

use crate::ecoregion::{EcoregionParameters, EcoregionTable};
use crate::errors::{ModelError, ModelResult};
use crate::species::{FoliageHabit, SpeciesParameters, SpeciesTable};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TableConfig {
    #[serde(default)]
    species: Vec<SpeciesParameters>,
    #[serde(default)]
    ecoregions: Vec<EcoregionParameters>,
}

/// Parse and validate the two parameter tables from a TOML document with
/// `[[species]]` and `[[ecoregions]]` arrays.
pub fn load_tables(text: &str) -> ModelResult<(SpeciesTable, EcoregionTable)> {
    let config: TableConfig = toml::from_str(text)?;
    for params in &config.species {
        validate_species(params)?;
    }
    for params in &config.ecoregions {
        validate_ecoregion(params)?;
    }
    Ok((
        SpeciesTable::new(config.species),
        EcoregionTable::new(config.ecoregions),
    ))
}

fn check_fraction(name: &str, owner: &str, value: f64) -> ModelResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ModelError::InvalidConfiguration(format!(
            "{owner}: {name} must be in [0,1], got {value}"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, owner: &str, value: f64) -> ModelResult<()> {
    if !(value > 0.0) {
        return Err(ModelError::InvalidConfiguration(format!(
            "{owner}: {name} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn validate_species(params: &SpeciesParameters) -> ModelResult<()> {
    let who = &params.name;
    check_positive("longevity", who, params.longevity)?;
    check_positive("leaf_longevity", who, params.leaf_longevity)?;
    check_positive("max_anpp", who, params.max_anpp)?;
    check_positive("max_biomass", who, params.max_biomass)?;
    check_positive("leaf_cn", who, params.leaf_cn)?;
    check_positive("wood_cn", who, params.wood_cn)?;
    check_positive("fine_root_cn", who, params.fine_root_cn)?;
    check_positive("coarse_root_cn", who, params.coarse_root_cn)?;
    check_fraction("leaf_fraction", who, params.leaf_fraction)?;
    check_fraction("leaf_lignin", who, params.leaf_lignin)?;
    check_fraction("wood_lignin", who, params.wood_lignin)?;
    check_fraction("fine_root_lignin", who, params.fine_root_lignin)?;
    check_fraction("n_resorption_fraction", who, params.n_resorption_fraction)?;
    check_fraction(
        "monthly_wood_mortality",
        who,
        params.monthly_wood_mortality,
    )?;
    if params.maximum_temperature <= params.optimum_temperature {
        return Err(ModelError::InvalidConfiguration(format!(
            "{who}: maximum_temperature must exceed optimum_temperature"
        )));
    }
    if let FoliageHabit::Deciduous { drop_month } = params.foliage {
        if !(1..=12).contains(&drop_month) {
            return Err(ModelError::InvalidConfiguration(format!(
                "{who}: drop_month must be in 1..=12, got {drop_month}"
            )));
        }
    }
    Ok(())
}

fn validate_ecoregion(params: &EcoregionParameters) -> ModelResult<()> {
    let who = &params.name;
    check_positive("water_capacity", who, params.water_capacity)?;
    check_fraction("percent_sand", who, params.percent_sand)?;
    check_fraction("percent_clay", who, params.percent_clay)?;
    check_fraction("soil_drain", who, params.soil_drain)?;
    if params.initial_mineral_n < 0.0 {
        return Err(ModelError::InvalidConfiguration(format!(
            "{who}: initial_mineral_n must be non-negative"
        )));
    }
    if !(-90.0..=90.0).contains(&params.latitude) {
        return Err(ModelError::InvalidConfiguration(format!(
            "{who}: latitude must be in [-90,90], got {}",
            params.latitude
        )));
    }
    Ok(())
}
