//! Shared infrastructure for the standcycle forest stand model.
//!
//! This crate holds everything the engines in `standcycle-century` consume
//! but do not own: the error type, the simulation clock, the monthly climate
//! driver record, and the immutable per-species / per-ecoregion parameter
//! tables with their TOML loader.

pub mod climate;
pub mod clock;
pub mod config;
pub mod ecoregion;
pub mod errors;
pub mod species;

pub use climate::MonthlyClimate;
pub use clock::{SimulationClock, MONTH_FRACTION};
pub use ecoregion::{EcoregionId, EcoregionParameters, EcoregionTable};
pub use errors::{ModelError, ModelResult};
pub use species::{FoliageHabit, SpeciesId, SpeciesParameters, SpeciesTable};
