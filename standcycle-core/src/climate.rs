use serde::{Deserialize, Serialize};

/// Per-site monthly weather and soil-moisture drivers.
///
/// These values are produced by external collaborators (weather generators,
/// soil-water bookkeeping, drought indices) and consumed read-only by the
/// engines. Temperatures are in degrees C, water amounts in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyClimate {
    /// Total precipitation for the month.
    pub precipitation: f64,
    /// Mean air temperature.
    pub avg_temperature: f64,
    /// Minimum air temperature.
    pub min_temperature: f64,
    /// Maximum air temperature.
    pub max_temperature: f64,
    /// Potential evapotranspiration for the month.
    pub pet: f64,
    /// Soil temperature in the rooting zone.
    pub soil_temperature: f64,
    /// Plant-available soil water.
    pub available_water: f64,
}

impl MonthlyClimate {
    /// Ratio of water supply to evaporative demand, used by the water
    /// limit and by the decomposition moisture/anaerobic factors.
    ///
    /// With negligible demand the ratio is pinned low rather than allowed
    /// to blow up; a dormant month with no PET should not look wet.
    pub fn water_to_pet_ratio(&self) -> f64 {
        if self.pet >= 0.01 {
            (self.available_water + self.precipitation) / self.pet
        } else {
            0.01
        }
    }
}

impl Default for MonthlyClimate {
    fn default() -> Self {
        Self {
            precipitation: 8.0,
            avg_temperature: 12.0,
            min_temperature: 5.0,
            max_temperature: 19.0,
            pet: 9.0,
            soil_temperature: 11.0,
            available_water: 6.0,
        }
    }
}
