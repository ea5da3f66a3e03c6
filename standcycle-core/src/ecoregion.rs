//! Static per-ecoregion soil and site parameters.

use crate::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Small integer key for an ecoregion, assigned in table order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EcoregionId(pub u16);

/// Soil and texture parameters shared by all sites in an ecoregion.
///
/// `latitude`, `wilting_point` and `percent_clay` are not read by the
/// engines; they are carried for the external collaborators (weather
/// generation, soil-water bookkeeping) that produce the monthly drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EcoregionParameters {
    /// Display name, used only in messages.
    pub name: String,

    /// Volumetric water content at field capacity minus wilting point,
    /// the plant-available water holding capacity of the rooting zone.
    /// unit: cm water / cm soil
    /// default: 0.2
    pub water_capacity: f64,

    /// Water content below which plants cannot extract water.
    /// unit: cm water / cm soil
    /// default: 0.1
    pub wilting_point: f64,

    /// Sand mass fraction of the mineral soil.
    /// unit: dimensionless, [0,1]
    /// default: 0.45
    pub percent_sand: f64,

    /// Clay mass fraction of the mineral soil.
    /// unit: dimensionless, [0,1]
    /// default: 0.2
    pub percent_clay: f64,

    /// Drainage index; 1.0 drains freely, 0.0 is permanently saturated.
    /// Scales the anaerobic decomposition penalty.
    /// unit: dimensionless, [0,1]
    /// default: 0.75
    pub soil_drain: f64,

    /// Mineral nitrogen stock at site initialization.
    /// unit: g N / m2
    /// default: 3.0
    pub initial_mineral_n: f64,

    /// Representative latitude of the ecoregion.
    /// unit: degrees, positive north
    /// default: 45.0
    pub latitude: f64,
}

impl Default for EcoregionParameters {
    fn default() -> Self {
        Self {
            name: "default upland".to_string(),
            water_capacity: 0.2,
            wilting_point: 0.1,
            percent_sand: 0.45,
            percent_clay: 0.2,
            soil_drain: 0.75,
            initial_mineral_n: 3.0,
            latitude: 45.0,
        }
    }
}

/// Immutable lookup table of ecoregion parameters, indexed by [`EcoregionId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcoregionTable {
    entries: Vec<EcoregionParameters>,
}

impl EcoregionTable {
    pub fn new(entries: Vec<EcoregionParameters>) -> Self {
        Self { entries }
    }

    /// Look up an ecoregion. A miss is a fatal configuration error.
    pub fn get(&self, id: EcoregionId) -> ModelResult<&EcoregionParameters> {
        self.entries
            .get(id.0 as usize)
            .ok_or(ModelError::UnknownEcoregion(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
